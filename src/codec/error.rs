//! Error types for decoding and encoding `.wsb` documents

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted field path, e.g. `Configuration.MappedFolders.MappedFolder[1].HostFolder`
    pub path: String,
    pub reason: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Every violation found in one validation pass, in field traversal order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid WSB configuration: {}", join_issues(.issues))]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub(crate) fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Whether any issue was reported against exactly this field path
    pub fn mentions(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed WSB document at byte {position}: {message}")]
    MalformedDocument { position: u64, message: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("File IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("XML rendering error: {message}")]
    Render { message: String },
}

impl CodecError {
    pub(crate) fn malformed(position: u64, message: impl fmt::Display) -> Self {
        CodecError::MalformedDocument {
            position,
            message: message.to_string(),
        }
    }

    pub(crate) fn render(err: impl fmt::Display) -> Self {
        CodecError::Render {
            message: err.to_string(),
        }
    }

    /// The validation report, when the failure came from the schema
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            CodecError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(path: &str, reason: &str) -> ValidationIssue {
        ValidationIssue {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_display_lists_every_issue() {
        let err = ValidationError::new(vec![
            issue("Configuration.VGpu", "bad"),
            issue("Configuration.MemoryInMB", "worse"),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid WSB configuration: Configuration.VGpu: bad; Configuration.MemoryInMB: worse"
        );
        assert!(err.mentions("Configuration.VGpu"));
        assert!(!err.mentions("Configuration"));
    }

    #[test]
    fn test_codec_error_exposes_validation() {
        let err = CodecError::from(ValidationError::new(vec![issue("a", "b")]));
        assert_eq!(err.validation().map(|v| v.issues().len()), Some(1));
        assert!(CodecError::malformed(3, "x").validation().is_none());
    }
}
