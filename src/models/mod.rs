//! Data model for Windows Sandbox configuration files

pub mod configuration;

pub use configuration::*;
