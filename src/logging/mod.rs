//! Structured logging configuration for wsbconf
//!
//! The library only emits `tracing` events; the binary installs a subscriber
//! through [`init_logging`]. Console output goes to stderr so logs never mix
//! with converted documents on stdout.

use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging configuration for wsbconf
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: LogLevel,
    /// Log format (json, pretty, compact)
    pub format: LogFormat,
    /// Output destination (stderr, file, both)
    pub output: LogOutput,
    /// File path for file output
    pub file_path: Option<String>,
    /// Include source file and line numbers
    pub include_source: bool,
    /// Trace-level output for the codec modules
    pub performance_tracing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log output formats
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable format for development
    Pretty,
    Compact,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Log output destinations
#[derive(Debug, Clone, PartialEq)]
pub enum LogOutput {
    Stderr,
    File,
    Both,
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            "both" => Ok(LogOutput::Both),
            _ => Err(format!("Invalid log output: {}", s)),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            file_path: None,
            include_source: false,
            performance_tracing: false,
        }
    }
}

impl LogConfig {
    /// Create a development-friendly log configuration
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            file_path: None,
            include_source: true,
            performance_tracing: true,
        }
    }

    /// Load configuration from `WSBCONF_LOG_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("WSBCONF_LOG_LEVEL") {
            if let Ok(parsed_level) = LogLevel::from_str(&level) {
                config.level = parsed_level;
            }
        }

        if let Ok(format) = std::env::var("WSBCONF_LOG_FORMAT") {
            if let Ok(parsed_format) = LogFormat::from_str(&format) {
                config.format = parsed_format;
            }
        }

        if let Ok(output) = std::env::var("WSBCONF_LOG_OUTPUT") {
            if let Ok(parsed_output) = LogOutput::from_str(&output) {
                config.output = parsed_output;
            }
        }

        if let Ok(file_path) = std::env::var("WSBCONF_LOG_FILE") {
            config.file_path = Some(file_path);
        }

        if let Ok(include_source) = std::env::var("WSBCONF_LOG_SOURCE") {
            config.include_source = include_source.to_lowercase() == "true";
        }

        config
    }
}

/// Initialize the global tracing subscriber with the given configuration
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if matches!(config.output, LogOutput::Stderr | LogOutput::Both) {
        layers.push(create_stderr_layer(config).with_filter(create_filter(config)).boxed());
    }

    if matches!(config.output, LogOutput::File | LogOutput::Both) {
        let file_path = config
            .file_path
            .as_deref()
            .ok_or("File path required for file output")?;
        layers.push(
            create_file_layer(config, file_path)?
                .with_filter(create_filter(config))
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    info!("Logging initialized with config: {:?}", config);
    Ok(())
}

/// Create an environment filter based on the configuration. `RUST_LOG`
/// overrides it when set.
fn create_filter(config: &LogConfig) -> EnvFilter {
    let mut filter_str = format!("wsbconf={}", config.level.as_filter());

    if config.performance_tracing {
        filter_str.push_str(",wsbconf::codec=trace");
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str))
}

fn create_stderr_layer(config: &LogConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_file(config.include_source)
        .with_line_number(config.include_source);

    match config.format {
        LogFormat::Pretty => Box::new(layer.pretty()),
        LogFormat::Compact => Box::new(layer.compact()),
        LogFormat::Json => Box::new(layer.json()),
    }
}

fn create_file_layer(
    config: &LogConfig,
    file_path: &str,
) -> Result<BoxedLayer, Box<dyn std::error::Error + Send + Sync>> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;

    let layer = fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_timer(UtcTime::rfc_3339())
        .with_file(config.include_source)
        .with_line_number(config.include_source);

    let boxed: BoxedLayer = match config.format {
        LogFormat::Pretty => Box::new(layer.pretty()),
        LogFormat::Compact => Box::new(layer.compact()),
        LogFormat::Json => Box::new(layer.json()),
    };
    Ok(boxed)
}

/// Times a block and logs the duration under `operation`
#[macro_export]
macro_rules! trace_performance {
    ($name:expr, $block:block) => {{
        let span = tracing::debug_span!("performance", operation = $name);
        let _enter = span.enter();
        let start = std::time::Instant::now();

        let result = $block;

        tracing::debug!(
            operation = $name,
            duration_us = start.elapsed().as_micros() as u64,
            "Performance trace"
        );

        result
    }};
}

/// Initialize logging for testing environments
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let config = LogConfig {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            file_path: None,
            include_source: true,
            performance_tracing: true,
        };

        if let Err(e) = init_logging(&config) {
            eprintln!("Failed to initialize test logging: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("PRETTY").unwrap(), LogFormat::Pretty);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_output_parsing() {
        assert_eq!(LogOutput::from_str("Both").unwrap(), LogOutput::Both);
        assert!(LogOutput::from_str("stdout").is_err());
    }

    #[test]
    fn test_config_presets() {
        let default_config = LogConfig::default();
        assert_eq!(default_config.level, LogLevel::Warn);
        assert_eq!(default_config.output, LogOutput::Stderr);

        let dev_config = LogConfig::development();
        assert_eq!(dev_config.level, LogLevel::Debug);
        assert_eq!(dev_config.format, LogFormat::Pretty);
        assert!(dev_config.performance_tracing);
    }

    #[test]
    fn test_file_output_requires_path() {
        let config = LogConfig {
            output: LogOutput::File,
            file_path: None,
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn test_performance_macro() {
        init_test_logging();

        let result = trace_performance!("parse", {
            crate::codec::parse("<Configuration/>").map(|config| config.configuration.folders().len())
        });

        assert_eq!(result.unwrap(), 0);
    }
}
