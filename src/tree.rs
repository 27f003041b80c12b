//! Value tree to document mapping.
//!
//! Each map entry becomes nodes of the parent it is mapped into:
//!
//! | value            | output                                                  |
//! |------------------|---------------------------------------------------------|
//! | fragment         | the fragment's top-level nodes, key ignored             |
//! | non-empty map    | element named by the key, entries mapped into it        |
//! | sequence         | container element holding one element per item          |
//! | empty collection | nothing                                                 |
//! | scalar           | element named by the key with the scalar as its content |
//!
//! List items are named by the name mapper registered for the singular item
//! name. A `<` key prefix drops the container so items join the parent.

use tracing::trace;

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::key::{KeyName, ListContainer, ListName, split_attributes, split_list_name};
use crate::mapper::NameMappers;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::value::{Map, Value};

/// Prefix marking a string value for CDATA output.
pub const CDATA_PREFIX: &str = "cdata:";

/// Walks a value tree and builds the matching nodes in a [`Document`].
pub struct TreeMapper<'a> {
    doc: &'a mut Document,
    mappers: &'a NameMappers,
    max_depth: usize,
}

impl<'a> TreeMapper<'a> {
    pub fn new(doc: &'a mut Document, mappers: &'a NameMappers) -> Self {
        Self {
            doc,
            mappers,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Map every entry of `input` into `parent`, in order, and return `parent`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] when a key or mapped item name is not a valid
    ///   element name, or an attribute name is empty or invalid
    /// - [`Error::DepthLimitExceeded`] when nesting exceeds the limit
    pub fn map(&mut self, input: &Map, parent: NodeId) -> Result<NodeId> {
        for (key, value) in input {
            self.map_entry(key, value, parent, 0)?;
        }
        Ok(parent)
    }

    fn map_children(&mut self, value: &Value, parent: NodeId, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthLimitExceeded {
                max_depth: self.max_depth,
            });
        }

        match value {
            Value::Map(map) => {
                for (key, value) in map {
                    self.map_entry(key, value, parent, depth)?;
                }
            }
            // A sequence nested directly in a list is walked by index.
            Value::Seq(items) => {
                for (index, value) in items.iter().enumerate() {
                    self.map_entry(&index.to_string(), value, parent, depth)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn map_entry(&mut self, key: &str, value: &Value, parent: NodeId, depth: usize) -> Result<()> {
        match value {
            Value::Fragment(fragment) => self.import_fragment(fragment, parent),
            Value::Map(map) if !map.is_empty() => {
                let element = self.create_element(key, None)?;
                self.map_children(value, element, depth + 1)?;
                self.doc.append_child(parent, element);
            }
            Value::Map(_) => trace!(key, "empty map produces no output"),
            Value::Seq(items) => self.map_list(key, items, parent, depth)?,
            scalar => {
                let element = self.create_element(key, Some(scalar))?;
                self.doc.append_child(parent, element);
            }
        }
        Ok(())
    }

    fn map_list(&mut self, key: &str, items: &[Value], parent: NodeId, depth: usize) -> Result<()> {
        if items.is_empty() {
            trace!(key, "empty list produces no output");
            return Ok(());
        }

        let ListName { container, item } = split_list_name(key);
        let mappers = self.mappers;
        let mapper = mappers.resolve(&item);
        trace!(key, item = %item, count = items.len(), "mapping list");

        let list = match &container {
            ListContainer::Flatten => parent,
            ListContainer::Named(name) => self.create_element(name, None)?,
        };

        for (index, value) in items.iter().enumerate() {
            let name = mapper(&item, index, value);
            match value {
                Value::Fragment(fragment) => self.import_fragment(fragment, list),
                Value::Map(_) | Value::Seq(_) => {
                    let element = self.create_element(&name, None)?;
                    self.map_children(value, element, depth + 1)?;
                    self.doc.append_child(list, element);
                }
                scalar => {
                    let element = self.create_element(&name, Some(scalar))?;
                    self.doc.append_child(list, element);
                }
            }
        }

        if list != parent {
            self.doc.append_child(parent, list);
        }
        Ok(())
    }

    /// Create an element from a key, with optional scalar content.
    ///
    /// A rejected element name is reported as the whole key; a rejected
    /// attribute name is reported alone.
    fn create_element(&mut self, key: &str, value: Option<&Value>) -> Result<NodeId> {
        let KeyName { name, attributes } = split_attributes(key)?;
        let element = self.doc.create_element(&name).map_err(|e| match e {
            Error::InvalidName { reason, .. } => Error::invalid_name(key, reason),
            other => other,
        })?;

        if let Some(value) = value {
            self.append_content(element, value);
        }
        for (attr_name, attr_value) in &attributes {
            self.doc.set_attribute(element, attr_name, attr_value)?;
        }
        Ok(element)
    }

    fn append_content(&mut self, element: NodeId, value: &Value) {
        if let Some(data) = value.as_str().and_then(|s| s.strip_prefix(CDATA_PREFIX)) {
            let cdata = self.doc.create_cdata(data);
            self.doc.append_child(element, cdata);
        } else if let Some(text) = value.to_text().filter(|t| !t.is_empty()) {
            let text = self.doc.create_text(text);
            self.doc.append_child(element, text);
        }
    }

    fn import_fragment(&mut self, fragment: &Document, parent: NodeId) {
        for &node in fragment.children(fragment.document()) {
            let imported = self.doc.import_node(fragment, node);
            self.doc.append_child(parent, imported);
        }
    }
}
