//! Wire-format converter: Jenkins `config.xml` → compact in-memory tree.
//!
//! The converter preserves leaf text verbatim (no trimming, no locale
//! coercion) and never collapses repeated sibling tags — multiplicity is
//! normalized by the consumer, not here. The returned node is a synthetic
//! document node whose single child is the root element, so callers can
//! branch on the root tag (`flow-definition` vs `project`).

use quick_xml::Reader;
use quick_xml::events::Event;

use paramexport_shared::{ExportError, Result};

// ---------------------------------------------------------------------------
// XmlNode
// ---------------------------------------------------------------------------

/// A node in the converted document tree.
///
/// Invariant: a node is either a leaf (text, no children) or an interior
/// node (children, no text). Whitespace between child elements is not text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlNode {
    /// Leaf text, verbatim from the source document.
    pub text: Option<String>,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Children in document order. Repeated tags stay as separate entries.
    pub children: Vec<(String, XmlNode)>,
}

impl XmlNode {
    /// First child with the given tag, if any.
    pub fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, node)| node)
    }

    /// All children with the given tag, in document order. A singleton
    /// yields a one-element sequence; an absent tag yields an empty one.
    pub fn children_named(&self, tag: &str) -> Vec<&XmlNode> {
        self.children
            .iter()
            .filter(|(name, _)| name == tag)
            .map(|(_, node)| node)
            .collect()
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Distinct child tags in first-appearance order.
    pub fn tags(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for (name, _) in &self.children {
            if !seen.contains(&name.as_str()) {
                seen.push(name);
            }
        }
        seen
    }

    /// Walk a chain of first-child tags; `None` if any hop is missing.
    pub fn descend(&self, path: &[&str]) -> Option<&XmlNode> {
        let mut node = self;
        for tag in path {
            node = node.child(tag)?;
        }
        Some(node)
    }
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// An element being built while its end tag is still pending.
struct Frame {
    tag: String,
    node: XmlNode,
    text: String,
}

/// Convert a wire-format XML document into an [`XmlNode`] tree.
///
/// Fails with [`ExportError::Parse`] when the input is not well-formed;
/// callers treat that as fatal for the one document only.
pub fn convert(input: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(input);
    let mut document = XmlNode::default();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut node = XmlNode::default();
                for attr in e.attributes() {
                    let attr = attr.map_err(|err| {
                        ExportError::parse(format!("bad attribute in <{tag}>: {err}"))
                    })?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .map_err(|err| {
                            ExportError::parse(format!("bad attribute value in <{tag}>: {err}"))
                        })?
                        .into_owned();
                    node.attributes.push((key, value));
                }
                stack.push(Frame {
                    tag,
                    node,
                    text: String::new(),
                });
            }
            Ok(Event::Empty(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut node = XmlNode::default();
                for attr in e.attributes() {
                    let attr = attr.map_err(|err| {
                        ExportError::parse(format!("bad attribute in <{tag}>: {err}"))
                    })?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .map_err(|err| {
                            ExportError::parse(format!("bad attribute value in <{tag}>: {err}"))
                        })?
                        .into_owned();
                    node.attributes.push((key, value));
                }
                attach(&mut stack, &mut document, tag, node);
            }
            Ok(Event::Text(t)) => {
                if let Some(frame) = stack.last_mut() {
                    let unescaped = t.unescape().map_err(|err| {
                        ExportError::parse(format!("bad text in <{}>: {err}", frame.tag))
                    })?;
                    frame.text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ExportError::parse("unmatched closing tag"))?;
                let mut node = frame.node;
                // Whitespace collected between child elements is not leaf text.
                if node.children.is_empty() && !frame.text.is_empty() {
                    node.text = Some(frame.text);
                }
                attach(&mut stack, &mut document, frame.tag, node);
            }
            Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ExportError::parse(format!(
                    "malformed XML at byte {}: {err}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if let Some(frame) = stack.last() {
        return Err(ExportError::parse(format!(
            "unclosed element <{}>",
            frame.tag
        )));
    }
    if document.children.is_empty() {
        return Err(ExportError::parse("document has no root element"));
    }

    Ok(document)
}

/// Attach a completed node to its parent, or to the document at top level.
fn attach(stack: &mut [Frame], document: &mut XmlNode, tag: String, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.node.children.push((tag, node)),
        None => document.children.push((tag, node)),
    }
}
