//! wsbconf - Windows Sandbox configuration tool
//!
//! Entry point: parses arguments, initializes logging and hands the command
//! to the CLI executor. Exit code 1 means the input was rejected, 2 means the
//! command itself failed.

use clap::Parser;
use std::io::Write;
use tracing::{debug, error};
use wsbconf::{
    cli::{Outcome, WsbCli, WsbCliExecutor},
    logging::{init_logging, LogConfig, LogLevel},
    Result, WsbError,
};

fn main() -> Result<()> {
    let cli = WsbCli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)
        .map_err(|e| WsbError::LoggingError(format!("Failed to initialize logging: {}", e)))?;

    debug!("wsbconf v{}", env!("CARGO_PKG_VERSION"));

    let executor = WsbCliExecutor::new(cli.json);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = executor.execute(cli.command, &mut out);
    out.flush()?;

    match result {
        Ok(Outcome::Success) => Ok(()),
        Ok(Outcome::Invalid) => std::process::exit(1),
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("error: {:#}", e);
            std::process::exit(2);
        }
    }
}
