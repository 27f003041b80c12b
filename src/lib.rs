//! # arrayxml
//!
//! Convert nested maps and sequences into XML. Element names, attributes,
//! list item names and CDATA sections are all described by the map keys and
//! values themselves, so plain data turns into structured markup without a
//! schema.
//!
//! ## Key syntax
//!
//! - `name@attr=value` — element `name` with attribute `attr`
//! - `items` holding a list — `<items>` with one `<item>` per entry
//! - `items|entry` — explicit item name
//! - `<items` — no container; items join the enclosing element
//! - value `"cdata:text"` — `text` written as a CDATA section
//!
//! ## Quick Start
//!
//! ```
//! use arrayxml::{Options, Value, to_string};
//!
//! let input = Value::map([(
//!     "root",
//!     Value::map([("elements", Value::seq([Value::map([("id", 1)])]))]),
//! )]);
//!
//! let xml = to_string(&input, &Options::default()).unwrap();
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\"?>\n\
//!      <root>\n  <elements>\n    <element>\n      <id>1</id>\n    </element>\n  </elements>\n</root>\n"
//! );
//! ```
//!
//! ## Name mappers
//!
//! List item names can depend on position and value. Mappers are registered
//! under the singular item name:
//!
//! ```
//! use arrayxml::{Options, Value, to_string};
//!
//! let options = Options::new()
//!     .with_declaration(false)
//!     .with_indent(None)
//!     .with_name_mapper("element", |name, _index, value| {
//!         format!("{name}{}", value.get("id").and_then(Value::as_str).unwrap_or_default())
//!     });
//!
//! let input = Value::map([("elements", Value::seq([Value::map([("id", "One")])]))]);
//! let xml = to_string(&input, &options).unwrap();
//! assert_eq!(xml, "<elements><elementOne><id>One</id></elementOne></elements>\n");
//! ```

pub mod dom;
pub mod error;
pub mod key;
pub mod mapper;
pub mod options;
pub mod tree;
pub mod value;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use dom::{Document, NodeId, SaveOptions};
pub use error::{Error, Result};
pub use key::{KeyName, ListContainer, ListName, split_attributes, split_list_name};
pub use mapper::{NameMapper, NameMappers};
pub use options::Options;
pub use tree::TreeMapper;
pub use value::{Map, Value};

use tracing::debug;

/// Convert a value tree into a [`Document`].
///
/// # Errors
///
/// - [`Error::RootMustBeAssociative`] when `root` is not a map
/// - [`Error::InvalidName`] for keys, item names or attributes that are not
///   valid XML names
/// - [`Error::DepthLimitExceeded`] when nesting exceeds `options.max_depth`
pub fn to_document(root: &Value, options: &Options) -> Result<Document> {
    let Value::Map(map) = root else {
        return Err(Error::RootMustBeAssociative);
    };

    let mut mappers = NameMappers::new();
    mappers.extend(&options.name_mappers);

    let mut doc = Document::new(options.version.clone(), options.encoding.clone());
    let document = doc.document();
    debug!(keys = map.len(), version = %options.version, "converting value tree");

    TreeMapper::new(&mut doc, &mappers)
        .with_max_depth(options.max_depth)
        .map(map, document)?;
    Ok(doc)
}

/// Convert a value tree into an XML string.
///
/// The string is UTF-8 regardless of the declared encoding; see [`to_bytes`].
pub fn to_string(root: &Value, options: &Options) -> Result<String> {
    let xml = to_document(root, options)?.save_xml(&options.save_options())?;
    debug!(len = xml.len(), "serialized document");
    Ok(xml)
}

/// Convert a value tree into XML bytes in the declared encoding.
pub fn to_bytes(root: &Value, options: &Options) -> Result<Vec<u8>> {
    to_document(root, options)?.save_bytes(&options.save_options())
}

/// Parse JSON and convert it into an XML string.
///
/// Object key order is preserved; objects keyed `"0".."n-1"` are sequences.
#[cfg(feature = "json")]
pub fn json_to_string(json: &str, options: &Options) -> Result<String> {
    let value: Value = serde_json::from_str(json)?;
    to_string(&value, options)
}
