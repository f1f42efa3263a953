//! Windows Sandbox configuration model
//!
//! Mirrors the `.wsb` document layout: a `Configuration` root wrapping the
//! sandbox settings. Every setting is optional; an absent field means the
//! platform default applies.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Tri-state toggle shared by every on/off sandbox setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnableState {
    Enable,
    Disable,
    Default,
}

impl EnableState {
    /// Every legal literal, in the order the schema lists them
    pub const ALL: [EnableState; 3] = [EnableState::Enable, EnableState::Disable, EnableState::Default];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnableState::Enable => "Enable",
            EnableState::Disable => "Disable",
            EnableState::Default => "Default",
        }
    }
}

impl fmt::Display for EnableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnableState {
    type Err = String;

    /// Literals are case-sensitive: `enable` is not `Enable`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enable" => Ok(EnableState::Enable),
            "Disable" => Ok(EnableState::Disable),
            "Default" => Ok(EnableState::Default),
            _ => Err(format!("Invalid enable state: {}", s)),
        }
    }
}

/// Read-only flag of a mapped folder
///
/// The canonical form is the lowercase string `"true"` / `"false"`. Native
/// booleans are accepted on input and normalized to the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadOnlyState {
    True,
    False,
}

impl ReadOnlyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadOnlyState::True => "true",
            ReadOnlyState::False => "false",
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, ReadOnlyState::True)
    }
}

impl From<bool> for ReadOnlyState {
    fn from(flag: bool) -> Self {
        if flag {
            ReadOnlyState::True
        } else {
            ReadOnlyState::False
        }
    }
}

impl fmt::Display for ReadOnlyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadOnlyState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(ReadOnlyState::True),
            "false" => Ok(ReadOnlyState::False),
            _ => Err(format!("Invalid read-only state: {}", s)),
        }
    }
}

impl Serialize for ReadOnlyState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReadOnlyState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(flag) => Ok(ReadOnlyState::from(flag)),
            Repr::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// A host-to-sandbox directory sharing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MappedFolder {
    /// Folder on the host; required and non-empty
    pub host_folder: String,

    /// Destination inside the sandbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_folder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<ReadOnlyState>,
}

impl MappedFolder {
    pub fn new(host_folder: impl Into<String>) -> Self {
        Self {
            host_folder: host_folder.into(),
            sandbox_folder: None,
            read_only: None,
        }
    }

    pub fn with_sandbox_folder(mut self, sandbox_folder: impl Into<String>) -> Self {
        self.sandbox_folder = Some(sandbox_folder.into());
        self
    }

    pub fn with_read_only(mut self, read_only: impl Into<ReadOnlyState>) -> Self {
        self.read_only = Some(read_only.into());
        self
    }

    /// Whether the mapping is read-only; an absent flag means writable
    pub fn is_read_only(&self) -> bool {
        self.read_only.map(|state| state.as_bool()).unwrap_or(false)
    }
}

/// One or many folder mappings
///
/// The document format repeats the same `MappedFolder` element for both
/// cases, so the decoder records which shape it saw. Exactly one element
/// decodes to `Single`; two or more decode to `Many` in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FolderSet {
    Single(MappedFolder),
    Many(Vec<MappedFolder>),
}

impl FolderSet {
    pub fn len(&self) -> usize {
        match self {
            FolderSet::Single(_) => 1,
            FolderSet::Many(folders) => folders.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[MappedFolder] {
        match self {
            FolderSet::Single(folder) => std::slice::from_ref(folder),
            FolderSet::Many(folders) => folders,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappedFolder> {
        self.as_slice().iter()
    }

    pub fn into_vec(self) -> Vec<MappedFolder> {
        match self {
            FolderSet::Single(folder) => vec![folder],
            FolderSet::Many(folders) => folders,
        }
    }
}

impl<'a> IntoIterator for &'a FolderSet {
    type Item = &'a MappedFolder;
    type IntoIter = std::slice::Iter<'a, MappedFolder>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Container element holding the folder mappings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MappedFolders {
    pub mapped_folder: FolderSet,
}

impl MappedFolders {
    pub fn single(folder: MappedFolder) -> Self {
        Self {
            mapped_folder: FolderSet::Single(folder),
        }
    }

    pub fn many(folders: Vec<MappedFolder>) -> Self {
        Self {
            mapped_folder: FolderSet::Many(folders),
        }
    }
}

/// Command executed when the sandbox session starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogonCommand {
    pub command: String,
}

impl LogonCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// Sandbox settings carried by the `Configuration` root element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WsbConfiguration {
    /// GPU virtualization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_gpu: Option<EnableState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<EnableState>,

    /// Microphone access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_input: Option<EnableState>,

    /// Camera access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_input: Option<EnableState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_client: Option<EnableState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer_redirection: Option<EnableState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard_redirection: Option<EnableState>,

    /// Memory assigned to the sandbox, in megabytes
    #[serde(rename = "MemoryInMB", default, skip_serializing_if = "Option::is_none")]
    pub memory_in_mb: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_folders: Option<MappedFolders>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logon_command: Option<LogonCommand>,
}

impl WsbConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_v_gpu(mut self, state: EnableState) -> Self {
        self.v_gpu = Some(state);
        self
    }

    pub fn with_networking(mut self, state: EnableState) -> Self {
        self.networking = Some(state);
        self
    }

    pub fn with_audio_input(mut self, state: EnableState) -> Self {
        self.audio_input = Some(state);
        self
    }

    pub fn with_video_input(mut self, state: EnableState) -> Self {
        self.video_input = Some(state);
        self
    }

    pub fn with_protected_client(mut self, state: EnableState) -> Self {
        self.protected_client = Some(state);
        self
    }

    pub fn with_printer_redirection(mut self, state: EnableState) -> Self {
        self.printer_redirection = Some(state);
        self
    }

    pub fn with_clipboard_redirection(mut self, state: EnableState) -> Self {
        self.clipboard_redirection = Some(state);
        self
    }

    pub fn with_memory_in_mb(mut self, megabytes: u32) -> Self {
        self.memory_in_mb = Some(megabytes);
        self
    }

    pub fn with_mapped_folders(mut self, folders: MappedFolders) -> Self {
        self.mapped_folders = Some(folders);
        self
    }

    pub fn with_logon_command(mut self, command: impl Into<String>) -> Self {
        self.logon_command = Some(LogonCommand::new(command));
        self
    }

    /// Folder mappings as a flat slice, regardless of how many were declared
    pub fn folders(&self) -> &[MappedFolder] {
        self.mapped_folders
            .as_ref()
            .map(|folders| folders.mapped_folder.as_slice())
            .unwrap_or(&[])
    }

    /// The seven toggles paired with their element names, in document order
    pub fn toggles(&self) -> [(&'static str, Option<EnableState>); 7] {
        [
            ("VGpu", self.v_gpu),
            ("Networking", self.networking),
            ("AudioInput", self.audio_input),
            ("VideoInput", self.video_input),
            ("ProtectedClient", self.protected_client),
            ("PrinterRedirection", self.printer_redirection),
            ("ClipboardRedirection", self.clipboard_redirection),
        ]
    }
}

/// Root of a `.wsb` document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "Configuration")]
    pub configuration: WsbConfiguration,
}

impl Configuration {
    pub fn new(configuration: WsbConfiguration) -> Self {
        Self { configuration }
    }

    pub fn settings(&self) -> &WsbConfiguration {
        &self.configuration
    }
}

impl From<WsbConfiguration> for Configuration {
    fn from(configuration: WsbConfiguration) -> Self {
        Self::new(configuration)
    }
}
