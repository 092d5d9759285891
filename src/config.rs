//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Access Log Destinations
//!
//! ```bash
//! # LTSV lines on stdout (default)
//! export ACCESS_LOG_SINK="stdout"
//!
//! # Append to a file through a background writer
//! export ACCESS_LOG_SINK="file"
//! export ACCESS_LOG_PATH="/var/log/app/access.log"
//!
//! # Route lines through the tracing subscriber (target `access_log`)
//! export ACCESS_LOG_SINK="tracing"
//! ```
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `ACCESS_LOG_SINK` - `stdout`, `stderr`, `tracing` or `file` (default: `stdout`)
//! - `ACCESS_LOG_PATH` - Log file, required when `ACCESS_LOG_SINK=file`
//! - `ACCESS_LOG_QUEUE_CAPACITY` - File writer queue size (default: 10000, min: 100)
//! - `ACCESS_LOG_TIMESTAMP` - Prefix lines with `time:<rfc3339>` (default: `false`)
//! - `ACCESS_LOG_PANIC_CONTEXT` - Include request fields in panic lines (default: `true`)
//! - `REQUEST_ID_HEADER` - Request id header name (default: `x-request-id`)

use anyhow::{Context, Result};
use axum::http::HeaderName;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where access log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Stdout,
    Stderr,
    Tracing,
    File,
}

impl FromStr for SinkKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "tracing" => Ok(Self::Tracing),
            "file" => Ok(Self::File),
            other => anyhow::bail!(
                "ACCESS_LOG_SINK must be one of 'stdout', 'stderr', 'tracing', 'file', got '{}'",
                other
            ),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    pub access_log_sink: SinkKind,
    /// Required when `access_log_sink` is [`SinkKind::File`].
    pub access_log_path: Option<PathBuf>,
    /// Lines buffered between request handlers and the file writer.
    pub access_log_queue_capacity: usize,
    pub access_log_timestamp: bool,
    /// When false, panic lines carry only `level`, `message` and `stack`.
    pub access_log_panic_context: bool,
    pub request_id_header: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `ACCESS_LOG_SINK` names an unknown destination.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let access_log_sink = env::var("ACCESS_LOG_SINK")
            .ok()
            .map(|v| v.parse::<SinkKind>())
            .transpose()
            .context("Invalid access log sink")?
            .unwrap_or(SinkKind::Stdout);

        let access_log_path = env::var("ACCESS_LOG_PATH")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let access_log_queue_capacity = env::var("ACCESS_LOG_QUEUE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000);

        let access_log_timestamp = env_flag("ACCESS_LOG_TIMESTAMP").unwrap_or(false);
        let access_log_panic_context = env_flag("ACCESS_LOG_PANIC_CONTEXT").unwrap_or(true);

        let request_id_header =
            env::var("REQUEST_ID_HEADER").unwrap_or_else(|_| "x-request-id".to_string());

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            access_log_sink,
            access_log_path,
            access_log_queue_capacity,
            access_log_timestamp,
            access_log_panic_context,
            request_id_header,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - the file sink is selected without `ACCESS_LOG_PATH`
    /// - `access_log_queue_capacity` is outside 100..=1000000
    /// - `request_id_header` is not a valid header name
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.access_log_sink == SinkKind::File && self.access_log_path.is_none() {
            anyhow::bail!("ACCESS_LOG_PATH must be set when ACCESS_LOG_SINK is 'file'");
        }

        if self.access_log_queue_capacity < 100 {
            anyhow::bail!(
                "ACCESS_LOG_QUEUE_CAPACITY must be at least 100, got {}",
                self.access_log_queue_capacity
            );
        }

        if self.access_log_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "ACCESS_LOG_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.access_log_queue_capacity
            );
        }

        self.request_id_header_name()?;

        Ok(())
    }

    /// Parses `request_id_header` into a header name.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid HTTP header name.
    pub fn request_id_header_name(&self) -> Result<HeaderName> {
        HeaderName::from_bytes(self.request_id_header.as_bytes()).with_context(|| {
            format!(
                "REQUEST_ID_HEADER is not a valid header name: '{}'",
                self.request_id_header
            )
        })
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);

        match (&self.access_log_sink, &self.access_log_path) {
            (SinkKind::File, Some(path)) => tracing::info!(
                "  Access log: file {} (queue capacity: {})",
                path.display(),
                self.access_log_queue_capacity
            ),
            (kind, _) => tracing::info!("  Access log: {:?}", kind),
        }

        tracing::info!("  Access log timestamps: {}", self.access_log_timestamp);
        tracing::info!("  Panic request context: {}", self.access_log_panic_context);
        tracing::info!("  Request id header: {}", self.request_id_header);
    }
}

/// Reads a boolean flag: `true`/`1` or `false`/`0`, case-insensitive.
fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Some(false)
    } else {
        None
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
