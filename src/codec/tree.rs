//! Untyped document tree shared by the decoder, the encoder and the validator
//!
//! XML structural parsing produces this tree, JSON and TOML renditions of the
//! model convert into it, and a typed [`Configuration`] lowers into it. The
//! validator only ever walks this shape.

use crate::models::{Configuration, FolderSet, MappedFolder, WsbConfiguration};
use regex::Regex;
use std::sync::LazyLock;

/// Lexical form of a number inside element text: optional sign, no leading
/// zeros, no hex, optional fraction and exponent.
static NUMERIC_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$")
        .unwrap_or_else(|e| panic!("numeric text pattern must compile: {e}"))
});

static EMPTY_ELEMENT: Element = Element {
    children: Vec::new(),
};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Element text content, or a string from a JSON/TOML value
    Text(String),
    /// Native number from a JSON/TOML value
    Number(f64),
    /// Native boolean from a JSON/TOML value
    Bool(bool),
    /// JSON `null`
    Null,
    Element(Element),
    /// Same-named siblings, in document order
    List(Vec<Node>),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Text(_) => "text",
            Node::Number(_) => "number",
            Node::Bool(_) => "boolean",
            Node::Null => "null",
            Node::Element(_) => "element",
            Node::List(_) => "list",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Child elements of this node. An element with no content at all
    /// (`<Configuration/>`) reads as text, so blank text counts as empty.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(text) if text.trim().is_empty() => Some(&EMPTY_ELEMENT),
            _ => None,
        }
    }

    /// Numeric reading of a leaf. Text only counts when it is
    /// unambiguously a decimal number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Node::Number(n) => Some(*n),
            Node::Text(text) if NUMERIC_TEXT.is_match(text) => text.parse().ok(),
            _ => None,
        }
    }
}

/// Ordered, attribute-free element children with unique names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    children: Vec<(String, Node)>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    /// Sets `name`, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, node: Node) {
        let name = name.into();
        match self.children.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = node,
            None => self.children.push((name, node)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, node: Node) -> Self {
        self.insert(name, node);
        self
    }

    /// Adds a sibling the way XML repeats elements: the second occurrence of
    /// a name turns the entry into a [`Node::List`], later ones extend it.
    pub(crate) fn append(&mut self, name: String, node: Node, repeated: &mut Vec<String>) {
        let Some((_, slot)) = self.children.iter_mut().find(|(key, _)| *key == name) else {
            self.children.push((name, node));
            return;
        };

        if repeated.contains(&name) {
            if let Node::List(items) = slot {
                items.push(node);
            }
        } else {
            let first = std::mem::replace(slot, Node::Null);
            *slot = Node::List(vec![first, node]);
            repeated.push(name);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&serde_json::Value> for Node {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Node::Null,
            Value::Bool(flag) => Node::Bool(*flag),
            Value::Number(n) => n.as_f64().map(Node::Number).unwrap_or(Node::Null),
            Value::String(text) => Node::Text(text.clone()),
            Value::Array(items) => Node::List(items.iter().map(Node::from).collect()),
            Value::Object(map) => Node::Element(Element {
                children: map.iter().map(|(k, v)| (k.clone(), Node::from(v))).collect(),
            }),
        }
    }
}

impl From<&toml::Value> for Node {
    fn from(value: &toml::Value) -> Self {
        use toml::Value;

        match value {
            Value::String(text) => Node::Text(text.clone()),
            Value::Integer(n) => Node::Number(*n as f64),
            Value::Float(n) => Node::Number(*n),
            Value::Boolean(flag) => Node::Bool(*flag),
            Value::Datetime(dt) => Node::Text(dt.to_string()),
            Value::Array(items) => Node::List(items.iter().map(Node::from).collect()),
            Value::Table(table) => Node::Element(Element {
                children: table.iter().map(|(k, v)| (k.clone(), Node::from(v))).collect(),
            }),
        }
    }
}

fn text(value: impl ToString) -> Node {
    Node::Text(value.to_string())
}

fn lower_folder(folder: &MappedFolder) -> Node {
    let mut element = Element::new().with("HostFolder", text(&folder.host_folder));
    if let Some(sandbox_folder) = &folder.sandbox_folder {
        element.insert("SandboxFolder", text(sandbox_folder));
    }
    if let Some(read_only) = folder.read_only {
        element.insert("ReadOnly", text(read_only));
    }
    Node::Element(element)
}

fn lower_settings(settings: &WsbConfiguration) -> Element {
    let mut element = Element::new();

    for (name, state) in settings.toggles() {
        if let Some(state) = state {
            element.insert(name, text(state));
        }
    }

    if let Some(megabytes) = settings.memory_in_mb {
        element.insert("MemoryInMB", text(megabytes));
    }

    if let Some(folders) = &settings.mapped_folders {
        let mapped = match &folders.mapped_folder {
            FolderSet::Single(folder) => lower_folder(folder),
            FolderSet::Many(items) => Node::List(items.iter().map(lower_folder).collect()),
        };
        element.insert("MappedFolders", Node::Element(Element::new().with("MappedFolder", mapped)));
    }

    if let Some(logon) = &settings.logon_command {
        element.insert(
            "LogonCommand",
            Node::Element(Element::new().with("Command", text(&logon.command))),
        );
    }

    element
}

/// Lowers a typed configuration into document order: toggles, memory,
/// folder mappings, logon command. Absent fields produce no children.
impl From<&Configuration> for Node {
    fn from(config: &Configuration) -> Self {
        Node::Element(Element::new().with(
            "Configuration",
            Node::Element(lower_settings(&config.configuration)),
        ))
    }
}
