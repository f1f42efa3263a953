//! Decoder: `.wsb` XML text to a validated [`Configuration`]

use crate::codec::error::CodecError;
use crate::codec::tree::{Element, Node};
use crate::codec::validator;
use crate::models::Configuration;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tracing::{debug, instrument};

/// An element whose end tag has not been seen yet
struct OpenElement {
    name: String,
    children: Element,
    repeated: Vec<String>,
    text: String,
}

impl OpenElement {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Element::new(),
            repeated: Vec::new(),
            text: String::new(),
        }
    }

    /// Leaf text is trimmed; text mixed with child elements is dropped.
    fn into_node(self) -> (String, Node) {
        let node = if self.children.is_empty() {
            Node::Text(self.text.trim().to_string())
        } else {
            Node::Element(self.children)
        };
        (self.name, node)
    }
}

fn element_name(start: &BytesStart<'_>, position: u64) -> Result<String, CodecError> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|e| CodecError::malformed(position, e))
}

struct TreeBuilder {
    stack: Vec<OpenElement>,
    root: Option<(String, Node)>,
}

impl TreeBuilder {
    fn open(&mut self, name: String, position: u64) -> Result<(), CodecError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(CodecError::malformed(
                position,
                format!("unexpected second root element <{}>", name),
            ));
        }
        self.stack.push(OpenElement::new(name));
        Ok(())
    }

    fn close(&mut self, position: u64) -> Result<(), CodecError> {
        let open = self
            .stack
            .pop()
            .ok_or_else(|| CodecError::malformed(position, "end tag without a matching start tag"))?;
        let (name, node) = open.into_node();

        match self.stack.last_mut() {
            Some(parent) => parent.children.append(name, node, &mut parent.repeated),
            None => self.root = Some((name, node)),
        }
        Ok(())
    }

    fn text(&mut self, value: &str, position: u64) -> Result<(), CodecError> {
        match self.stack.last_mut() {
            Some(open) => open.text.push_str(value),
            None if value.trim().is_empty() => {}
            None => {
                return Err(CodecError::malformed(position, "text outside of the root element"));
            }
        }
        Ok(())
    }

    fn finish(self, position: u64) -> Result<Node, CodecError> {
        if let Some(open) = self.stack.last() {
            return Err(CodecError::malformed(
                position,
                format!("element <{}> is never closed", open.name),
            ));
        }

        let (name, node) = self
            .root
            .ok_or_else(|| CodecError::malformed(position, "document has no root element"))?;
        Ok(Node::Element(Element::new().with(name, node)))
    }
}

/// Structural XML parse into the untyped tree. The result is an element
/// holding the document's single root element.
///
/// Attributes, comments, processing instructions and the DOCTYPE are
/// skipped; repeated sibling elements become [`Node::List`] in document
/// order.
pub fn read_document(xml: &str) -> Result<Node, CodecError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = TreeBuilder {
        stack: Vec::new(),
        root: None,
    };

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = element_name(&start, position)?;
                builder.open(name, position)?;
            }
            Ok(Event::Empty(start)) => {
                let name = element_name(&start, position)?;
                builder.open(name, position)?;
                builder.close(position)?;
            }
            Ok(Event::End(_)) => builder.close(position)?,
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|e| CodecError::malformed(position, e))?;
                builder.text(&value, position)?;
            }
            Ok(Event::CData(data)) => {
                let bytes = data.into_inner();
                let value =
                    std::str::from_utf8(&bytes).map_err(|e| CodecError::malformed(position, e))?;
                builder.text(value, position)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(CodecError::malformed(reader.error_position() as u64, e)),
        }
    }

    builder.finish(reader.buffer_position() as u64)
}

/// Parse `.wsb` XML text into a validated configuration
///
/// Malformed XML fails with [`CodecError::MalformedDocument`] before the
/// schema runs; schema violations fail with [`CodecError::Validation`]
/// carrying every issue found.
#[instrument(skip_all, fields(bytes = xml.len()))]
pub fn parse(xml: &str) -> Result<Configuration, CodecError> {
    let document = read_document(xml)?;
    let config = validator::validate(&document).inspect_err(|err| {
        debug!(issues = err.issues().len(), "document failed validation");
    })?;

    debug!(folders = config.configuration.folders().len(), "decoded configuration");
    Ok(config)
}

/// Read and parse a `.wsb` file. Bytes that are not UTF-8 make the
/// document malformed; only filesystem failures surface as IO errors.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Configuration, CodecError> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes)
        .map_err(|e| CodecError::malformed(e.utf8_error().valid_up_to() as u64, e))?;
    parse(&content)
}
