//! Encoder: [`Configuration`] to canonical `.wsb` XML text

use crate::codec::error::CodecError;
use crate::codec::tree::Node;
use crate::codec::validator;
use crate::models::Configuration;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
pub const INDENT_WIDTH: usize = 2;

/// Serialize a configuration to `.wsb` XML
///
/// The value is validated first, so hand-built configurations that break the
/// schema (a zero `MemoryInMB`, an empty `HostFolder`) fail with the same
/// [`CodecError::Validation`] the decoder produces.
#[instrument(skip_all)]
pub fn serialize(config: &Configuration) -> Result<String, CodecError> {
    serialize_node(&Node::from(config))
}

/// Serialize a JSON rendition of the model, e.g. built by another tool
pub fn serialize_value(value: &serde_json::Value) -> Result<String, CodecError> {
    serialize_node(&Node::from(value))
}

/// Validate an untyped tree and render its canonical form
pub fn serialize_node(node: &Node) -> Result<String, CodecError> {
    let canonical = validator::validate(node).inspect_err(|err| {
        debug!(issues = err.issues().len(), "refusing to serialize invalid configuration");
    })?;

    let body = render_document(&Node::from(&canonical))?;
    debug!(bytes = body.len(), "encoded configuration");
    Ok(format!("{}\n{}", XML_DECLARATION, body))
}

/// Serialize and write a `.wsb` file
pub fn write_file<P: AsRef<Path>>(path: P, config: &Configuration) -> Result<(), CodecError> {
    let xml = serialize(config)?;
    std::fs::write(path, xml)?;
    Ok(())
}

/// Renders every root-level entry of `document` as indented XML, without the
/// declaration line. Root elements are written even when empty.
pub fn render_document(document: &Node) -> Result<String, CodecError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);

    if let Node::Element(roots) = document {
        for (name, node) in roots.iter() {
            match node.as_element() {
                Some(root) if root.is_empty() => writer
                    .write_event(Event::Empty(BytesStart::new(name)))
                    .map_err(CodecError::render)?,
                _ => write_node(&mut writer, name, node)?,
            }
        }
    }

    String::from_utf8(writer.into_inner()).map_err(CodecError::render)
}

fn write_leaf<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), CodecError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(CodecError::render)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(CodecError::render)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(CodecError::render)
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Empty containers are suppressed; lists repeat the element name.
fn write_node<W: Write>(writer: &mut Writer<W>, name: &str, node: &Node) -> Result<(), CodecError> {
    match node {
        Node::Element(children) if children.is_empty() => Ok(()),
        Node::Element(children) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(CodecError::render)?;
            for (child, value) in children.iter() {
                write_node(writer, child, value)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(CodecError::render)
        }
        Node::List(items) => items.iter().try_for_each(|item| write_node(writer, name, item)),
        Node::Text(text) => write_leaf(writer, name, text),
        Node::Number(n) => write_leaf(writer, name, &render_number(*n)),
        Node::Bool(flag) => write_leaf(writer, name, if *flag { "true" } else { "false" }),
        Node::Null => Ok(()),
    }
}
