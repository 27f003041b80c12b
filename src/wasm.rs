//! WASM bindings for browser-based conversion.
//!
//! This module exposes JSON to XML conversion to JavaScript via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::Options;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Convert a JSON document to XML.
///
/// The JSON root must be an object.
#[wasm_bindgen]
pub fn json_to_xml(json: &str, declare: bool) -> Result<String, JsValue> {
    let options = Options::new().with_declaration(declare);
    crate::json_to_string(json, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert a JSON document to XML with explicit declaration values.
#[wasm_bindgen]
pub fn json_to_xml_with(
    json: &str,
    version: &str,
    encoding: Option<String>,
    declare: bool,
    indent: Option<usize>,
) -> Result<String, JsValue> {
    let mut options = Options::new()
        .with_version(version)
        .with_declaration(declare)
        .with_indent(indent);
    options.encoding = encoding;
    crate::json_to_string(json, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}
