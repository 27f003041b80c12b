//! Document serialization through quick-xml.
//!
//! Output layout:
//!
//! ```text
//! <?xml version="1.0"?>      (only when declaring)
//! <root>
//!   <id>1</id>
//! </root>
//! ```
//!
//! The declaration sits on its own line and the body ends with a newline, so
//! dropping the declaration removes exactly the first line. Elements whose
//! content is text or CDATA stay on one line.

use std::io::Write;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use memchr::memmem;
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::{Document, NodeData, NodeId};
use crate::error::{Error, Result};

/// Serialization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Emit the `<?xml ...?>` declaration.
    pub declare: bool,
    /// Spaces per nesting level, `None` for compact output.
    pub indent: Option<usize>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            declare: true,
            indent: Some(2),
        }
    }
}

impl Document {
    /// Serialize to a UTF-8 string.
    ///
    /// The declared encoding is only written into the declaration; use
    /// [`Document::save_bytes`] to encode the output accordingly.
    pub fn save_xml(&self, options: &SaveOptions) -> Result<String> {
        self.serialize(options, None)
    }

    /// Serialize to bytes in the declared encoding (UTF-8 when none is set).
    ///
    /// Characters the encoding cannot represent become numeric character
    /// references in text and attribute values. In CDATA content the section
    /// is closed around them so the reference is markup, not data. UTF-16
    /// labels produce UTF-16 with a byte order mark.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedEncoding`] when the encoding label is unknown
    /// - [`Error::InvalidName`] when an element or attribute name has
    ///   characters the encoding cannot represent
    pub fn save_bytes(&self, options: &SaveOptions) -> Result<Vec<u8>> {
        let Some(label) = self.encoding() else {
            return Ok(self.save_xml(options)?.into_bytes());
        };
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::UnsupportedEncoding(label.to_string()))?;

        if encoding == UTF_8 {
            return Ok(self.save_xml(options)?.into_bytes());
        }
        if encoding == UTF_16LE || encoding == UTF_16BE {
            let xml = self.save_xml(options)?;
            return Ok(encode_utf16(&xml, encoding == UTF_16BE));
        }

        let xml = self.serialize(options, Some(encoding))?;
        let (bytes, _, _) = encoding.encode(&xml);
        Ok(bytes.into_owned())
    }

    /// Serialize into any [`Write`] destination, encoded as [`Document::save_bytes`] does.
    pub fn write_xml<W: Write>(&self, mut writer: W, options: &SaveOptions) -> Result<()> {
        writer.write_all(&self.save_bytes(options)?)?;
        Ok(())
    }

    /// Serialize to a string ready for `target`: names are checked against it
    /// and CDATA is split around characters it cannot represent.
    fn serialize(&self, options: &SaveOptions, target: Option<&'static Encoding>) -> Result<String> {
        let mut out = Vec::new();
        if options.declare {
            self.write_declaration(&mut out)?;
            out.push(b'\n');
        }

        let body = self.write_body(Vec::new(), options.indent, target)?;
        if !body.is_empty() {
            out.extend_from_slice(&body);
            out.push(b'\n');
        }

        Ok(String::from_utf8(out)?)
    }

    fn write_declaration(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut writer = Writer::new(out);
        writer.write_event(Event::Decl(BytesDecl::new(
            self.version(),
            self.encoding(),
            None,
        )))?;
        Ok(())
    }

    fn write_body(
        &self,
        buf: Vec<u8>,
        indent: Option<usize>,
        target: Option<&'static Encoding>,
    ) -> Result<Vec<u8>> {
        let mut writer = match indent {
            Some(width) => Writer::new_with_indent(buf, b' ', width),
            None => Writer::new(buf),
        };
        for &child in self.children(self.document()) {
            self.write_node(&mut writer, child, target)?;
        }
        Ok(writer.into_inner())
    }

    fn write_node<W: Write>(
        &self,
        writer: &mut Writer<W>,
        id: NodeId,
        target: Option<&'static Encoding>,
    ) -> Result<()> {
        let Some(node) = self.get(id) else {
            return Ok(());
        };

        match &node.data {
            NodeData::Document => {
                for &child in &node.children {
                    self.write_node(writer, child, target)?;
                }
            }
            NodeData::Element { name, attributes } => {
                if let Some(encoding) = target {
                    check_encodable_name(name, encoding)?;
                    for attr in attributes {
                        check_encodable_name(&attr.name, encoding)?;
                    }
                }

                let mut start = BytesStart::new(name.as_str());
                for attr in attributes {
                    start.push_attribute((attr.name.as_str(), attr.value.as_str()));
                }

                if node.children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for &child in &node.children {
                        self.write_node(writer, child, target)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                }
            }
            NodeData::Text(text) => {
                // Quotes need no escaping in content.
                let escaped = partial_escape(text.as_str());
                writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
            }
            NodeData::CData(text) => {
                for section in cdata_sections(text) {
                    match target {
                        Some(encoding) => write_cdata_for(writer, section, encoding)?,
                        None => writer.write_event(Event::CData(BytesCData::new(section)))?,
                    }
                }
            }
        }
        Ok(())
    }
}

fn is_encodable(c: char, encoding: &'static Encoding) -> bool {
    if c.is_ascii() {
        return true;
    }
    let mut buf = [0u8; 4];
    let (_, _, unmappable) = encoding.encode(c.encode_utf8(&mut buf));
    !unmappable
}

fn check_encodable_name(name: &str, encoding: &'static Encoding) -> Result<()> {
    match name.chars().find(|&c| !is_encodable(c, encoding)) {
        Some(c) => Err(Error::invalid_name(
            name,
            format!("'{c}' cannot be represented in {}", encoding.name()),
        )),
        None => Ok(()),
    }
}

/// Write one CDATA section, closing it around characters the encoding cannot
/// represent and writing those as character references.
fn write_cdata_for<W: Write>(
    writer: &mut Writer<W>,
    section: &str,
    encoding: &'static Encoding,
) -> Result<()> {
    let mut run_start = 0;
    for (pos, c) in section.char_indices() {
        if is_encodable(c, encoding) {
            continue;
        }
        if run_start < pos {
            writer.write_event(Event::CData(BytesCData::new(&section[run_start..pos])))?;
        }
        let reference = format!("&#{};", u32::from(c));
        writer.write_event(Event::Text(BytesText::from_escaped(reference)))?;
        run_start = pos + c.len_utf8();
    }
    if run_start < section.len() || section.is_empty() {
        writer.write_event(Event::CData(BytesCData::new(&section[run_start..])))?;
    }
    Ok(())
}

/// UTF-16 with a byte order mark.
fn encode_utf16(text: &str, big_endian: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + text.len() * 2);
    let mut push = |unit: u16| {
        if big_endian {
            out.extend_from_slice(&unit.to_be_bytes());
        } else {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    };
    push(0xFEFF);
    text.encode_utf16().for_each(&mut push);
    out
}

/// Split CDATA content so no section contains the `]]>` terminator.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    for pos in memmem::find_iter(text.as_bytes(), b"]]>") {
        // Cut between "]]" and ">"; both are ASCII so the index is a char boundary.
        sections.push(&text[start..pos + 2]);
        start = pos + 2;
    }
    sections.push(&text[start..]);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_document(encoding: Option<&str>) -> Document {
        let mut doc = Document::new("1.0", encoding.map(str::to_string));
        let root = doc.create_element("root").unwrap();
        doc.append_child(doc.document(), root);
        doc
    }

    #[test]
    fn test_empty_element() {
        let doc = simple_document(None);
        assert_eq!(doc.to_xml(true).unwrap(), "<?xml version=\"1.0\"?>\n<root/>\n");
        assert_eq!(doc.to_xml(false).unwrap(), "<root/>\n");
    }

    #[test]
    fn test_declaration_with_encoding() {
        let doc = simple_document(Some("utf8"));
        assert_eq!(
            doc.to_xml(true).unwrap(),
            "<?xml version=\"1.0\" encoding=\"utf8\"?>\n<root/>\n"
        );
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::default();
        assert_eq!(doc.to_xml(true).unwrap(), "<?xml version=\"1.0\"?>\n");
        assert_eq!(doc.to_xml(false).unwrap(), "");
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = simple_document(None);
        let root = doc.document_element().unwrap();
        let text = doc.create_text("a < b & \"c\"");
        doc.append_child(root, text);
        assert_eq!(
            doc.to_xml(false).unwrap(),
            "<root>a &lt; b &amp; \"c\"</root>\n"
        );
    }

    #[test]
    fn test_attribute_value_is_escaped() {
        let mut doc = simple_document(None);
        let root = doc.document_element().unwrap();
        doc.set_attribute(root, "title", "\"x\" & <y>").unwrap();
        let xml = doc.to_xml(false).unwrap();
        assert!(xml.starts_with("<root title=\""));
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&lt;y"));
        assert!(!xml.contains("\"x\""));
    }

    #[test]
    fn test_nested_indentation() {
        let mut doc = simple_document(None);
        let root = doc.document_element().unwrap();
        let child = doc.create_element("child").unwrap();
        let text = doc.create_text("1");
        doc.append_child(child, text);
        doc.append_child(root, child);
        assert_eq!(
            doc.to_xml(false).unwrap(),
            "<root>\n  <child>1</child>\n</root>\n"
        );

        let compact = doc
            .save_xml(&SaveOptions {
                declare: false,
                indent: None,
            })
            .unwrap();
        assert_eq!(compact, "<root><child>1</child></root>\n");
    }

    #[test]
    fn test_cdata_section() {
        let mut doc = simple_document(None);
        let root = doc.document_element().unwrap();
        let cdata = doc.create_cdata("<b>bold</b>");
        doc.append_child(root, cdata);
        assert_eq!(
            doc.to_xml(false).unwrap(),
            "<root><![CDATA[<b>bold</b>]]></root>\n"
        );
    }

    #[test]
    fn test_cdata_terminator_is_split() {
        assert_eq!(cdata_sections("plain"), vec!["plain"]);
        assert_eq!(cdata_sections("a]]>b"), vec!["a]]", ">b"]);
        assert_eq!(cdata_sections("]]>]]>"), vec!["]]", ">]]", ">"]);
    }

    #[test]
    fn test_save_bytes_encodes() {
        let mut doc = simple_document(Some("ISO-8859-1"));
        let root = doc.document_element().unwrap();
        let text = doc.create_text("café Ω");
        doc.append_child(root, text);

        let bytes = doc.save_bytes(&SaveOptions::default()).unwrap();
        let expected_body: &[u8] = b"<root>caf\xe9 &#937;</root>\n";
        assert!(bytes.ends_with(expected_body));
    }

    fn encoded_document(
        encoding: &str,
        build: impl FnOnce(&mut Document, NodeId),
    ) -> Result<Vec<u8>> {
        let mut doc = simple_document(Some(encoding));
        let root = doc.document_element().unwrap();
        build(&mut doc, root);
        doc.save_bytes(&SaveOptions {
            declare: false,
            indent: None,
        })
    }

    #[test]
    fn test_save_bytes_cdata_closes_around_unmappable() {
        let bytes = encoded_document("ISO-8859-1", |doc, root| {
            let cdata = doc.create_cdata("<é Ω>");
            doc.append_child(root, cdata);
        })
        .unwrap();
        assert_eq!(bytes, b"<root><![CDATA[<\xe9 ]]>&#937;<![CDATA[>]]></root>\n");
    }

    #[test]
    fn test_save_bytes_cdata_only_unmappable() {
        let bytes = encoded_document("ISO-8859-1", |doc, root| {
            let cdata = doc.create_cdata("Ω");
            doc.append_child(root, cdata);
        })
        .unwrap();
        assert_eq!(bytes, b"<root>&#937;</root>\n");
    }

    #[test]
    fn test_save_bytes_empty_cdata_is_kept() {
        let bytes = encoded_document("ISO-8859-1", |doc, root| {
            let cdata = doc.create_cdata("");
            doc.append_child(root, cdata);
        })
        .unwrap();
        assert_eq!(bytes, b"<root><![CDATA[]]></root>\n");
    }

    #[test]
    fn test_save_bytes_rejects_unmappable_element_name() {
        let err = encoded_document("ISO-8859-1", |doc, root| {
            let el = doc.create_element("Ωmega").unwrap();
            doc.append_child(root, el);
        })
        .unwrap_err();
        assert_eq!(err.name(), Some("Ωmega"));
    }

    #[test]
    fn test_save_bytes_rejects_unmappable_attribute_name() {
        let err = encoded_document("ISO-8859-1", |doc, root| {
            doc.set_attribute(root, "Ω", "v").unwrap();
        })
        .unwrap_err();
        assert_eq!(err.name(), Some("Ω"));
    }

    #[test]
    fn test_save_bytes_attribute_value_uses_reference() {
        let bytes = encoded_document("ISO-8859-1", |doc, root| {
            doc.set_attribute(root, "v", "Ω").unwrap();
        })
        .unwrap();
        assert_eq!(bytes, b"<root v=\"&#937;\"/>\n");
    }

    #[test]
    fn test_save_bytes_utf16_has_bom() {
        let mut doc = simple_document(Some("UTF-16"));
        let root = doc.document_element().unwrap();
        let cdata = doc.create_cdata("Ω");
        doc.append_child(root, cdata);

        let bytes = doc.save_bytes(&SaveOptions::default()).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);

        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let text = String::from_utf16(&units).unwrap();
        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"UTF-16\"?>\n<root><![CDATA[Ω]]></root>\n"
        );
    }

    #[test]
    fn test_save_bytes_utf16be() {
        let doc = simple_document(Some("UTF-16BE"));
        let bytes = doc
            .save_bytes(&SaveOptions {
                declare: false,
                indent: None,
            })
            .unwrap();
        let expected: Vec<u8> = std::iter::once(0xFEFF)
            .chain("<root/>\n".encode_utf16())
            .flat_map(u16::to_be_bytes)
            .collect();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_save_bytes_unknown_encoding() {
        let doc = simple_document(Some("klingon"));
        assert!(matches!(
            doc.save_bytes(&SaveOptions::default()),
            Err(Error::UnsupportedEncoding(label)) if label == "klingon"
        ));
    }
}
