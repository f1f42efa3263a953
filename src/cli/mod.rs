//! Command-line interface for wsbconf
//!
//! Thin caller of the codec: every command reads a file, runs it through
//! `parse` or `serialize`, and prints the result. Validation failures are
//! reported as data (an [`Outcome::Invalid`] plus the issue list), not as
//! errors; IO and input-format problems propagate as errors.

use crate::codec::{self, CodecError, Node, ValidationIssue};
use crate::models::{
    Configuration, EnableState, MappedFolder, MappedFolders, WsbConfiguration,
};
use crate::{trace_performance, Result, WsbError};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// wsbconf command-line interface
#[derive(Parser, Debug)]
#[command(name = "wsbconf")]
#[command(about = "Parse, validate and generate Windows Sandbox (.wsb) configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct WsbCli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable JSON output for machine-readable results
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a .wsb file and print the configuration model
    Parse {
        /// Path to the .wsb file
        file: PathBuf,

        /// Output format for the model
        #[arg(short, long, value_enum, default_value_t = ModelFormat::Json)]
        format: ModelFormat,
    },

    /// Check a .wsb file against the schema and list every issue
    Validate {
        /// Path to the .wsb file
        file: PathBuf,
    },

    /// Rewrite a .wsb file in canonical layout
    Format {
        /// Path to the .wsb file
        file: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a .wsb file from a JSON or TOML rendition of the model
    Build {
        /// Input file (.json or .toml)
        file: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a sample configuration
    Template {
        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelFormat {
    Json,
    Toml,
}

/// How a command finished when no error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The input was read but rejected by the schema or the XML reader
    Invalid,
}

/// Sample configuration used by `wsbconf template`
pub fn sample_configuration() -> Configuration {
    Configuration::new(
        WsbConfiguration::new()
            .with_v_gpu(EnableState::Enable)
            .with_networking(EnableState::Disable)
            .with_audio_input(EnableState::Enable)
            .with_video_input(EnableState::Disable)
            .with_memory_in_mb(8192)
            .with_mapped_folders(MappedFolders::many(vec![
                MappedFolder::new(r"C:\Projects").with_read_only(true),
                MappedFolder::new(r"C:\Temp")
                    .with_sandbox_folder(r"C:\Workspace")
                    .with_read_only(false),
            ]))
            .with_logon_command("cmd.exe /c start https://example.com"),
    )
}

/// CLI command executor
pub struct WsbCliExecutor {
    json_output: bool,
}

impl WsbCliExecutor {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Execute a CLI command, writing results to `out`
    pub fn execute<W: Write>(&self, command: Commands, out: &mut W) -> Result<Outcome> {
        match command {
            Commands::Parse { file, format } => self.execute_parse(&file, format, out),
            Commands::Validate { file } => self.execute_validate(&file, out),
            Commands::Format { file, output } => self.execute_format(&file, output.as_deref(), out),
            Commands::Build { file, output } => self.execute_build(&file, output.as_deref(), out),
            Commands::Template { output } => {
                let xml = codec::serialize(&sample_configuration())?;
                self.emit(&xml, output.as_deref(), out)
            }
        }
    }

    fn execute_parse<W: Write>(&self, file: &Path, format: ModelFormat, out: &mut W) -> Result<Outcome> {
        info!("Parsing {}", file.display());

        let config = match trace_performance!("parse_file", { codec::parse_file(file) }) {
            Ok(config) => config,
            Err(err) => return self.report_failure(file, err, out),
        };

        let rendered = match format {
            ModelFormat::Json => serde_json::to_string_pretty(&config)?,
            ModelFormat::Toml => toml::to_string_pretty(&config)?,
        };
        writeln!(out, "{}", rendered.trim_end())?;
        Ok(Outcome::Success)
    }

    fn execute_validate<W: Write>(&self, file: &Path, out: &mut W) -> Result<Outcome> {
        info!("Validating {}", file.display());

        if let Err(err) = codec::parse_file(file) {
            return self.report_failure(file, err, out);
        }

        if self.json_output {
            let report = serde_json::json!({
                "file": file.display().to_string(),
                "valid": true,
                "issues": [],
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        } else {
            writeln!(out, "valid: {}", file.display())?;
        }
        Ok(Outcome::Success)
    }

    fn execute_format<W: Write>(
        &self,
        file: &Path,
        output: Option<&Path>,
        out: &mut W,
    ) -> Result<Outcome> {
        info!("Formatting {}", file.display());

        let config = match codec::parse_file(file) {
            Ok(config) => config,
            Err(err) => return self.report_failure(file, err, out),
        };
        let xml = trace_performance!("serialize", { codec::serialize(&config) })?;
        self.emit(&xml, output, out)
    }

    fn execute_build<W: Write>(
        &self,
        file: &Path,
        output: Option<&Path>,
        out: &mut W,
    ) -> Result<Outcome> {
        info!("Building .wsb from {}", file.display());

        let model = read_model(file)?;
        match codec::serialize_node(&model) {
            Ok(xml) => self.emit(&xml, output, out),
            Err(err) => self.report_failure(file, err, out),
        }
    }

    fn emit<W: Write>(&self, xml: &str, output: Option<&Path>, out: &mut W) -> Result<Outcome> {
        match output {
            Some(path) => {
                std::fs::write(path, xml)?;
                debug!("Wrote {} bytes to {}", xml.len(), path.display());
                if self.json_output {
                    let report = serde_json::json!({"written": path.display().to_string()});
                    writeln!(out, "{}", report)?;
                }
            }
            None => writeln!(out, "{}", xml)?,
        }
        Ok(Outcome::Success)
    }

    /// Prints schema and XML problems; other failures propagate.
    fn report_failure<W: Write>(&self, file: &Path, err: CodecError, out: &mut W) -> Result<Outcome> {
        let issues = match err {
            CodecError::Validation(report) => report.issues().to_vec(),
            malformed @ CodecError::MalformedDocument { .. } => vec![ValidationIssue {
                path: String::new(),
                reason: malformed.to_string(),
            }],
            other => return Err(other.into()),
        };

        if self.json_output {
            let report = serde_json::json!({
                "file": file.display().to_string(),
                "valid": false,
                "issues": issues,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        } else {
            writeln!(out, "invalid: {}", file.display())?;
            for issue in &issues {
                if issue.path.is_empty() {
                    writeln!(out, "  - {}", issue.reason)?;
                } else {
                    writeln!(out, "  - {}", issue)?;
                }
            }
        }
        Ok(Outcome::Invalid)
    }
}

/// Loads a JSON or TOML rendition of the model into the untyped tree, so the
/// schema sees native booleans and numbers exactly as written.
fn read_model(file: &Path) -> Result<Node> {
    let content = std::fs::read_to_string(file)?;

    match file.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            let value: toml::Value = toml::from_str(&content).map_err(CodecError::from)?;
            Ok(Node::from(&value))
        }
        Some("json") | None => {
            let value: serde_json::Value =
                serde_json::from_str(&content).map_err(CodecError::from)?;
            Ok(Node::from(&value))
        }
        Some(other) => Err(WsbError::UnsupportedInput(format!(
            "cannot build from .{} files; use .json or .toml",
            other
        ))
        .into()),
    }
}
