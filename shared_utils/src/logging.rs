//! Logging Module
//!
//! tracing-based logging shared by the vid-gif tools:
//! - a daily rolling log file in the system temp directory
//! - optional mirroring of events onto stderr (verbose runs)
//! - structured records of every external tool invocation
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! init_logging("vid_gif", LogConfig::default()).expect("Failed to initialize logging");
//! info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory holding the rolling log files (system temp dir by default).
    pub log_dir: PathBuf,
    /// Number of rotated log files to keep.
    pub max_files: usize,
    /// Level applied to the program's own targets unless `RUST_LOG` is set.
    pub level: Level,
    /// Also write events to stderr. Off by default so that user-facing
    /// messages are not printed twice.
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::WARN,
            stderr: false,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }

    /// Filter directives used when `RUST_LOG` is not set.
    pub fn default_directives(&self, program_name: &str) -> String {
        let level = self.level.as_str().to_ascii_lowercase();
        format!("{}={},shared_utils={}", program_name, level, level)
    }
}

/// Install the global subscriber.
///
/// Log files are named `{program_name}.log.<date>` and rotated daily; only the
/// newest `max_files` are kept. Fails if a global subscriber is already set.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let file_prefix = format!("{}.log", program_name);
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&file_prefix)
        .max_log_files(config.max_files.max(1))
        .build(&config.log_dir)
        .with_context(|| format!("Failed to open log file in {:?}", config.log_dir))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives(program_name)));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let stderr_layer = config.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_line_number(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::debug!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = %file_prefix,
        max_files = config.max_files,
        level = ?config.level,
        "Logging system initialized"
    );

    Ok(())
}

/// Record one external tool invocation.
///
/// Successful runs log the diagnostics at debug level only; failures log them
/// at error level together with the command line.
pub fn log_external_tool(
    tool_name: &str,
    args: &[String],
    output: &str,
    exit_code: Option<i32>,
    duration: Duration,
) {
    let command = format_command_line(tool_name, args);

    match exit_code {
        Some(0) => {
            tracing::info!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = 0,
                "External tool completed successfully"
            );
            tracing::debug!(tool = tool_name, output = %output, "External tool output");
        }
        Some(code) => {
            tracing::error!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = code,
                output = %output,
                "External tool failed"
            );
        }
        None => {
            tracing::error!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                output = %output,
                "External tool terminated without exit code"
            );
        }
    }
}

/// `tool arg1 arg2 ...`, for logs and error messages.
pub fn format_command_line(tool_name: &str, args: &[String]) -> String {
    if args.is_empty() {
        tool_name.to_string()
    } else {
        format!("{} {}", tool_name, args.join(" "))
    }
}
