//! Schema for `.wsb` documents
//!
//! The single source of truth for what a legal configuration looks like.
//! Each field rule takes a tree node and either returns the normalized value
//! or records a [`ValidationIssue`] in the shared [`Report`]; object rules
//! evaluate every field before combining results, so one pass reports every
//! violation instead of stopping at the first.

use crate::codec::error::{ValidationError, ValidationIssue};
use crate::codec::tree::{Element, Node};
use crate::models::{
    Configuration, EnableState, FolderSet, LogonCommand, MappedFolder, MappedFolders,
    ReadOnlyState, WsbConfiguration,
};
use std::fmt;
use tracing::trace;

const ROOT: &str = "Configuration";

const SETTINGS_FIELDS: [&str; 10] = [
    "VGpu",
    "Networking",
    "AudioInput",
    "VideoInput",
    "ProtectedClient",
    "PrinterRedirection",
    "ClipboardRedirection",
    "MemoryInMB",
    "MappedFolders",
    "LogonCommand",
];
const FOLDER_FIELDS: [&str; 3] = ["HostFolder", "SandboxFolder", "ReadOnly"];
const LOGON_FIELDS: [&str; 1] = ["Command"];
const FOLDERS_FIELDS: [&str; 1] = ["MappedFolder"];

/// Dotted path to the field being validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates issues across a validation pass
#[derive(Debug, Default)]
pub struct Report {
    issues: Vec<ValidationIssue>,
}

impl Report {
    pub fn push(&mut self, path: &FieldPath, reason: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.to_string(),
            reason: reason.into(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// A value only counts when no rule reported anything.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ => Err(ValidationError::new(self.issues)),
        }
    }
}

/// A field rule: normalized value, or `None` after recording an issue
pub type Rule<T> = fn(&Node, &FieldPath, &mut Report) -> Option<T>;

/// Validates a document tree whose root element holds `Configuration`.
pub fn validate(document: &Node) -> Result<Configuration, ValidationError> {
    let mut report = Report::default();
    let root = FieldPath::root();
    let config = element(document, &root, &mut report)
        .and_then(|el| required(el, ROOT, &root, &mut report, wsb_configuration))
        .map(Configuration::new);
    report.finish(config)
}

/// Validates a JSON rendition of the model, e.g. `{"Configuration": {...}}`.
pub fn validate_value(value: &serde_json::Value) -> Result<Configuration, ValidationError> {
    validate(&Node::from(value))
}

/// Runs a caller-constructed configuration through the schema and returns
/// its canonical form.
pub fn validate_config(config: &Configuration) -> Result<Configuration, ValidationError> {
    validate(&Node::from(config))
}

pub fn required<T>(
    el: &Element,
    name: &str,
    path: &FieldPath,
    report: &mut Report,
    rule: Rule<T>,
) -> Option<T> {
    let field = path.field(name);
    match el.get(name) {
        Some(node) => rule(node, &field, report),
        None => {
            report.push(&field, "required field is missing");
            None
        }
    }
}

/// `Some(None)` when the field is absent, `None` when it failed its rule
pub fn optional<T>(
    el: &Element,
    name: &str,
    path: &FieldPath,
    report: &mut Report,
    rule: Rule<T>,
) -> Option<Option<T>> {
    match el.get(name) {
        Some(node) => rule(node, &path.field(name), report).map(Some),
        None => Some(None),
    }
}

fn describe(node: &Node) -> String {
    match node {
        Node::Text(text) => format!("'{}'", text),
        Node::Number(n) => n.to_string(),
        Node::Bool(flag) => flag.to_string(),
        other => other.kind().to_string(),
    }
}

pub fn element<'a>(node: &'a Node, path: &FieldPath, report: &mut Report) -> Option<&'a Element> {
    let el = node.as_element();
    if el.is_none() {
        report.push(path, format!("expected an element, found {}", node.kind()));
    }
    el
}

/// Leaf strings. The decoder trims element text, so padded values would not
/// survive a round trip and are rejected.
pub fn string(node: &Node, path: &FieldPath, report: &mut Report) -> Option<String> {
    match node {
        Node::Text(text) if text.trim() != text => {
            report.push(path, "must not have leading or trailing whitespace");
            None
        }
        Node::Text(text) => Some(text.clone()),
        other => {
            report.push(path, format!("expected a string, found {}", other.kind()));
            None
        }
    }
}

pub fn non_empty_string(node: &Node, path: &FieldPath, report: &mut Report) -> Option<String> {
    if node.as_text().is_some_and(|text| text.trim().is_empty()) {
        report.push(path, "must not be empty");
        return None;
    }
    string(node, path, report)
}

pub fn enable_state(node: &Node, path: &FieldPath, report: &mut Report) -> Option<EnableState> {
    let parsed = node.as_text().and_then(|text| text.parse::<EnableState>().ok());
    if parsed.is_none() {
        let allowed: Vec<_> = EnableState::ALL.iter().map(EnableState::as_str).collect();
        report.push(
            path,
            format!("expected one of {}, found {}", allowed.join(", "), describe(node)),
        );
    }
    parsed
}

pub fn positive_integer(node: &Node, path: &FieldPath, report: &mut Report) -> Option<u32> {
    let Some(n) = node.as_number() else {
        report.push(path, format!("expected a positive integer, found {}", describe(node)));
        return None;
    };

    if !n.is_finite() || n.fract() != 0.0 {
        report.push(path, format!("must be an integer, found {}", n));
        None
    } else if n <= 0.0 {
        report.push(path, format!("must be greater than 0, found {}", n));
        None
    } else if n > f64::from(u32::MAX) {
        report.push(path, format!("must not exceed {}, found {}", u32::MAX, n));
        None
    } else {
        Some(n as u32)
    }
}

pub fn read_only_state(node: &Node, path: &FieldPath, report: &mut Report) -> Option<ReadOnlyState> {
    let parsed = match node {
        Node::Bool(flag) => Some(ReadOnlyState::from(*flag)),
        Node::Text(text) => text.parse().ok(),
        _ => None,
    };
    if parsed.is_none() {
        report.push(path, format!("expected 'true' or 'false', found {}", describe(node)));
    }
    parsed
}

fn note_unknown(el: &Element, known: &[&str], path: &FieldPath) {
    for key in el.keys().filter(|key| !known.contains(key)) {
        trace!(path = %path.field(key), "ignoring unknown field");
    }
}

pub fn mapped_folder(node: &Node, path: &FieldPath, report: &mut Report) -> Option<MappedFolder> {
    let el = element(node, path, report)?;
    note_unknown(el, &FOLDER_FIELDS, path);

    let host_folder = required(el, "HostFolder", path, report, non_empty_string);
    let sandbox_folder = optional(el, "SandboxFolder", path, report, string);
    let read_only = optional(el, "ReadOnly", path, report, read_only_state);

    Some(MappedFolder {
        host_folder: host_folder?,
        sandbox_folder: sandbox_folder?,
        read_only: read_only?,
    })
}

/// One record or an ordered sequence. Empty sequences are `None` (absent);
/// a one-element sequence becomes `Single`, the only shape the document
/// format can express for one mapping.
fn folder_set(node: &Node, path: &FieldPath, report: &mut Report) -> Option<Option<FolderSet>> {
    let Node::List(items) = node else {
        return mapped_folder(node, path, report).map(|folder| Some(FolderSet::Single(folder)));
    };

    let folders: Vec<_> = items
        .iter()
        .enumerate()
        .map(|(i, item)| mapped_folder(item, &path.index(i), report))
        .collect();
    let mut folders = folders.into_iter().collect::<Option<Vec<_>>>()?;

    Some(match folders.len() {
        0 => None,
        1 => folders.pop().map(FolderSet::Single),
        _ => Some(FolderSet::Many(folders)),
    })
}

pub fn mapped_folders(
    node: &Node,
    path: &FieldPath,
    report: &mut Report,
) -> Option<Option<MappedFolders>> {
    let el = element(node, path, report)?;
    note_unknown(el, &FOLDERS_FIELDS, path);

    let field = path.field("MappedFolder");
    match el.get("MappedFolder") {
        Some(set) => folder_set(set, &field, report)
            .map(|set| set.map(|mapped_folder| MappedFolders { mapped_folder })),
        None if el.is_empty() => Some(None),
        None => {
            report.push(&field, "required field is missing");
            None
        }
    }
}

pub fn logon_command(node: &Node, path: &FieldPath, report: &mut Report) -> Option<LogonCommand> {
    let el = element(node, path, report)?;
    note_unknown(el, &LOGON_FIELDS, path);

    let command = required(el, "Command", path, report, string)?;
    Some(LogonCommand { command })
}

pub fn wsb_configuration(
    node: &Node,
    path: &FieldPath,
    report: &mut Report,
) -> Option<WsbConfiguration> {
    let el = element(node, path, report)?;
    note_unknown(el, &SETTINGS_FIELDS, path);

    let v_gpu = optional(el, "VGpu", path, report, enable_state);
    let networking = optional(el, "Networking", path, report, enable_state);
    let audio_input = optional(el, "AudioInput", path, report, enable_state);
    let video_input = optional(el, "VideoInput", path, report, enable_state);
    let protected_client = optional(el, "ProtectedClient", path, report, enable_state);
    let printer_redirection = optional(el, "PrinterRedirection", path, report, enable_state);
    let clipboard_redirection = optional(el, "ClipboardRedirection", path, report, enable_state);
    let memory_in_mb = optional(el, "MemoryInMB", path, report, positive_integer);
    let mapped = match el.get("MappedFolders") {
        Some(node) => mapped_folders(node, &path.field("MappedFolders"), report),
        None => Some(None),
    };
    let logon = optional(el, "LogonCommand", path, report, logon_command);

    Some(WsbConfiguration {
        v_gpu: v_gpu?,
        networking: networking?,
        audio_input: audio_input?,
        video_input: video_input?,
        protected_client: protected_client?,
        printer_redirection: printer_redirection?,
        clipboard_redirection: clipboard_redirection?,
        memory_in_mb: memory_in_mb?,
        mapped_folders: mapped?,
        logon_command: logon?,
    })
}
