//! Arena-based XML document.
//!
//! This is the builder the tree mapper drives. Nodes live in a single vector
//! and refer to each other by [`NodeId`]; the document node sits at index 0
//! and its children are the top-level nodes of the output.
//!
//! Names are validated when elements are created and attributes are set, so
//! a built document always serializes to well-formed XML.

mod name;
mod serialize;

pub use name::{NameError, is_name_char, is_name_start_char, validate_name};
pub use serialize::SaveOptions;

use tracing::debug;

use crate::error::{Error, Result};

/// Unique identifier for a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes in declaration order.
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// Text content, escaped on output.
    Text(String),
    /// CDATA section content, written verbatim.
    CData(String),
}

/// XML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A node in the document arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An XML document with its declaration settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    version: String,
    encoding: Option<String>,
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("1.0", None)
    }
}

impl Document {
    /// Create an empty document with the given declaration values.
    pub fn new(version: impl Into<String>, encoding: Option<String>) -> Self {
        Self {
            version: version.into(),
            encoding,
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// The document node.
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    /// The first top-level element, if any.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.document())
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.data), Some(NodeData::Element { .. }))
    }

    /// Element name, `None` for other node kinds.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Element attributes, empty for other node kinds.
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Concatenated text and CDATA content of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(text) | NodeData::CData(text)) => out.push_str(text),
            Some(_) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Create a detached element.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] carrying `name` when it is not an XML name.
    pub fn create_element(&mut self, name: &str) -> Result<NodeId> {
        if let Err(e) = validate_name(name) {
            debug!(name, reason = %e.reason(), "rejected element name");
            return Err(Error::invalid_name(name, e.reason()));
        }
        Ok(self.alloc(Node::new(NodeData::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    /// Create a detached CDATA section.
    pub fn create_cdata(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::CData(text.into())))
    }

    /// Set an attribute on an element, replacing any previous value in place.
    ///
    /// Setting an attribute on a non-element node does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] carrying `name` when it is not an XML name.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        if let Err(e) = validate_name(name) {
            debug!(name, reason = %e.reason(), "rejected attribute name");
            return Err(Error::invalid_name(name, e.reason()));
        }
        if let Some(Node {
            data: NodeData::Element { attributes, .. },
            ..
        }) = self.get_mut(node)
        {
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.value = value.to_string(),
                None => attributes.push(Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            }
        }
        Ok(())
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.parent(child).is_none(), "node is already attached");
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Deep-copy `node` of another document into this one.
    ///
    /// The copy is detached; append it where it belongs. Importing the
    /// document node of `other` yields copies of all its top-level nodes
    /// appended to this document's node, and returns that node.
    pub fn import_node(&mut self, other: &Document, node: NodeId) -> NodeId {
        let Some(source) = other.get(node) else {
            return self.document();
        };
        let copy = match &source.data {
            NodeData::Document => self.document(),
            data => self.alloc(Node::new(data.clone())),
        };
        for &child in &source.children {
            let imported = self.import_node(other, child);
            self.append_child(copy, imported);
        }
        copy
    }

    /// Serialize with default formatting.
    pub fn to_xml(&self, declare: bool) -> Result<String> {
        self.save_xml(&SaveOptions {
            declare,
            ..SaveOptions::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::default();
        assert_eq!(doc.version(), "1.0");
        assert_eq!(doc.encoding(), None);
        assert!(doc.children(doc.document()).is_empty());
        assert_eq!(doc.document_element(), None);
    }

    #[test]
    fn test_node_ids_address_their_nodes() {
        let mut doc = Document::default();
        let ids: Vec<_> = (0..70_000).map(|i| doc.create_text(i.to_string())).collect();
        assert_eq!(doc.get(ids[0]).map(|n| &n.data), Some(&NodeData::Text("0".to_string())));
        assert_eq!(
            doc.get(ids[69_999]).map(|n| &n.data),
            Some(&NodeData::Text("69999".to_string()))
        );
        assert_ne!(ids[1], ids[65_537]);
    }

    #[test]
    fn test_build_tree() {
        let mut doc = Document::default();
        let root = doc.create_element("root").unwrap();
        let child = doc.create_element("child").unwrap();
        let text = doc.create_text("hello");
        doc.append_child(child, text);
        doc.append_child(root, child);
        doc.append_child(doc.document(), root);

        assert_eq!(doc.document_element(), Some(root));
        assert_eq!(doc.children(root), &[child]);
        assert_eq!(doc.parent(child), Some(root));
        assert_eq!(doc.name(child), Some("child"));
        assert_eq!(doc.text_content(root), "hello");
    }

    #[test]
    fn test_invalid_element_name() {
        let mut doc = Document::default();
        let err = doc.create_element(">root").unwrap_err();
        assert_eq!(err.name(), Some(">root"));
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut doc = Document::default();
        let el = doc.create_element("el").unwrap();
        doc.set_attribute(el, "a", "1").unwrap();
        doc.set_attribute(el, "b", "2").unwrap();
        doc.set_attribute(el, "a", "3").unwrap();

        let names: Vec<_> = doc.attributes(el).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(doc.attribute(el, "a"), Some("3"));
    }

    #[test]
    fn test_invalid_attribute_name() {
        let mut doc = Document::default();
        let el = doc.create_element("el").unwrap();
        let err = doc.set_attribute(el, ">", "").unwrap_err();
        assert_eq!(err.name(), Some(">"));
        assert!(doc.attributes(el).is_empty());
    }

    #[test]
    fn test_import_node_is_deep() {
        let mut fragment = Document::default();
        let outer = fragment.create_element("outer").unwrap();
        fragment.set_attribute(outer, "id", "x").unwrap();
        let inner = fragment.create_element("inner").unwrap();
        let cdata = fragment.create_cdata("raw");
        fragment.append_child(inner, cdata);
        fragment.append_child(outer, inner);
        fragment.append_child(fragment.document(), outer);

        let mut doc = Document::default();
        let imported = doc.import_node(&fragment, outer);
        assert_eq!(doc.parent(imported), None);
        assert_eq!(doc.name(imported), Some("outer"));
        assert_eq!(doc.attribute(imported, "id"), Some("x"));
        assert_eq!(doc.text_content(imported), "raw");

        // The source is untouched.
        assert_eq!(fragment.children(fragment.document()), &[outer]);
    }

    #[test]
    fn test_import_document_node_copies_top_level() {
        let mut fragment = Document::default();
        for name in ["a", "b"] {
            let el = fragment.create_element(name).unwrap();
            fragment.append_child(fragment.document(), el);
        }

        let mut doc = Document::default();
        let target = doc.import_node(&fragment, fragment.document());
        assert_eq!(target, doc.document());
        let names: Vec<_> = doc
            .children(doc.document())
            .iter()
            .filter_map(|&id| doc.name(id))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
