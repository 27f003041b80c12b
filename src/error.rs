//! Error types for arrayxml operations.

use thiserror::Error;

/// Errors that can occur while converting a value tree to XML.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Root element must be associative")]
    RootMustBeAssociative,

    /// `name` is the exact token that was rejected: the whole key for an
    /// element name, the attribute name alone for an attribute.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Maximum nesting depth ({max_depth}) exceeded")]
    DepthLimitExceeded { max_depth: usize },

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML writing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The offending identifier of an [`Error::InvalidName`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Error::InvalidName { name, .. } => Some(name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
