//! Conversion options.

use crate::dom::SaveOptions;
use crate::mapper::{NameMapper, NameMappers};
use crate::value::Value;

/// Default bound on input nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for [`to_document`](crate::to_document) and [`to_string`](crate::to_string).
///
/// # Example
///
/// ```
/// use arrayxml::Options;
///
/// let options = Options::new()
///     .with_version("1.1")
///     .with_encoding("UTF-8")
///     .with_declaration(false)
///     .with_name_mapper("element", |name, index, _| format!("{name}-{index}"));
/// assert_eq!(options.version, "1.1");
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// XML version written in the declaration.
    pub version: String,
    /// Encoding written in the declaration and used by byte output.
    pub encoding: Option<String>,
    /// Emit the `<?xml ...?>` declaration.
    pub declare: bool,
    /// Mappers merged over the default registry before conversion.
    pub name_mappers: NameMappers,
    /// Spaces per nesting level, `None` for compact output.
    pub indent: Option<usize>,
    /// Maximum element nesting before conversion fails.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: None,
            declare: true,
            name_mappers: NameMappers::default(),
            indent: Some(2),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_declaration(mut self, declare: bool) -> Self {
        self.declare = declare;
        self
    }

    /// Register a name mapper for a singular item name.
    pub fn with_name_mapper<F>(mut self, item_name: impl Into<String>, mapper: F) -> Self
    where
        F: Fn(&str, usize, &Value) -> String + Send + Sync + 'static,
    {
        self.name_mappers.register(item_name, mapper);
        self
    }

    pub fn with_shared_name_mapper(mut self, item_name: impl Into<String>, mapper: NameMapper) -> Self {
        self.name_mappers.register_shared(item_name, mapper);
        self
    }

    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            declare: self.declare,
            indent: self.indent,
        }
    }
}
