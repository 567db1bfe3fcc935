// ABOUTME: Logging configuration and structured logging setup
// ABOUTME: Configures tracing subscriber format and provides the privacy-preserving user id hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! Structured logging setup. Request logs carry a correlation id and a
//! truncated SHA-256 hash of the user id; the raw credential and message
//! content never reach the log stream.

use std::env;

use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (standard `RUST_LOG` syntax)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };
        Self { level, format }
    }

    /// Install the global tracing subscriber.
    ///
    /// Safe to call once per process; later calls are ignored so tests that
    /// share a process do not panic.
    pub fn init(&self) {
        let filter = EnvFilter::try_new(&self.level)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let result = match self.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
            LogFormat::Compact => builder.compact().try_init(),
        };
        drop(result);
    }
}

/// Hash a user id for log output.
///
/// Logs must be able to correlate activity per user without recording the
/// identifier itself; a truncated SHA-256 digest is stable and irreversible.
#[must_use]
pub fn hash_user_id(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    hex::encode(digest)[..16].to_owned()
}
