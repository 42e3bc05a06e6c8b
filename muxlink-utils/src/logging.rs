//! Logging infrastructure for muxlink
//!
//! Unified logging setup on the tracing ecosystem. Clients that own the
//! terminal log to a file under the XDG state dir; tools that do not can log
//! to stderr.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::{paths, MuxlinkError, Result};

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to stderr
    Stderr,
    /// Log to a file under the log directory
    File,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output destination
    pub output: LogOutput,
    /// Log level filter (e.g. "info", "muxlink=debug")
    pub filter: String,
    /// Log file name when output is [`LogOutput::File`]
    pub file_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "info".into(),
            file_name: "muxlink.log".into(),
        }
    }
}

impl LogConfig {
    /// Config for an attached client: file logging, filter from `MUXLINK_LOG`
    pub fn client() -> Self {
        Self {
            output: LogOutput::File,
            filter: std::env::var("MUXLINK_LOG").unwrap_or_else(|_| "warn".into()),
            ..Self::default()
        }
    }

    /// Verbose stderr config for development
    pub fn development() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "debug".into(),
            ..Self::default()
        }
    }
}

/// Initialize logging with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| MuxlinkError::config(format!("Invalid log filter: {}", e)))?;

    match config.output {
        LogOutput::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| MuxlinkError::internal(format!("Failed to init logging: {}", e)))?;
        }
        LogOutput::File => {
            let log_dir = paths::log_dir();
            std::fs::create_dir_all(&log_dir).map_err(|e| MuxlinkError::FileWrite {
                path: log_dir.clone(),
                source: e,
            })?;

            let log_path = log_dir.join(&config.file_name);
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| MuxlinkError::FileWrite {
                    path: log_path,
                    source: e,
                })?;

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_writer(file).with_ansi(false))
                .try_init()
                .map_err(|e| MuxlinkError::internal(format!("Failed to init logging: {}", e)))?;
        }
    }

    Ok(())
}
