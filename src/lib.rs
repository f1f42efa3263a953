//! wsbconf - Windows Sandbox configuration files
//!
//! Converts between `.wsb` XML documents and a validated, strongly-typed
//! [`Configuration`], in both directions. Decoding and encoding share one
//! schema, so `parse(&serialize(&c)?)? == c` for every configuration the
//! schema accepts.
//!
//! ```
//! use wsbconf::{parse, serialize};
//!
//! let xml = r#"<?xml version="1.0" encoding="utf-8"?>
//! <Configuration>
//!   <VGpu>Enable</VGpu>
//!   <Networking>Enable</Networking>
//!   <MemoryInMB>4096</MemoryInMB>
//! </Configuration>"#;
//!
//! let config = parse(xml).unwrap();
//! assert_eq!(config.configuration.memory_in_mb, Some(4096));
//!
//! let output = serialize(&config).unwrap();
//! assert_eq!(parse(&output).unwrap(), config);
//! ```

pub mod cli;
pub mod codec;
pub mod logging;
pub mod models;

pub use codec::{
    parse, serialize, serialize_value, validate_value, CodecError, ValidationError, ValidationIssue,
};
pub use models::*;

/// Result type alias for the CLI layer
pub type Result<T> = anyhow::Result<T>;

/// Error types raised outside the codec itself
#[derive(thiserror::Error, Debug)]
pub enum WsbError {
    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}
