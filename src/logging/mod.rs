//! Console logging and output control
//!
//! This module provides the [`Logger`] used by every stage of a mirror run. It keeps the
//! console vocabulary (sections, steps, success and warning lines) in one place and emits
//! each line as a `tracing` event, so verbosity is governed by the installed subscriber.

use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` in verbose mode.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .try_init();
}

/// Logger responsible for all user-visible output
///
/// Verbosity is decided by the subscriber installed with [`init`]; `detail` and `debug`
/// lines only show up at `debug` level.
#[derive(Debug, Clone)]
pub struct Logger {
    start_time: Instant,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Main section heading
    pub fn section(&self, title: &str) {
        tracing::info!("=== {} ===", title);
    }

    /// Sub-section heading
    pub fn subsection(&self, title: &str) {
        tracing::info!("--- {} ---", title);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    /// Information message
    pub fn info(&self, message: &str) {
        tracing::info!("ℹ️  {}", message);
    }

    /// Success message
    pub fn success(&self, message: &str) {
        tracing::info!("✅ {}", message);
    }

    /// Warning message
    pub fn warning(&self, message: &str) {
        tracing::warn!("⚠️  {}", message);
    }

    /// Error message
    pub fn error(&self, message: &str) {
        tracing::error!("❌ {}", message);
    }

    /// Step information
    pub fn step(&self, message: &str) {
        tracing::info!("▶️  {}", message);
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        tracing::debug!("   {}", message);
    }

    /// Key-value pair summary display
    pub fn summary_kv(&self, title: &str, items: &[(&str, String)]) {
        self.subsection(title);
        for (key, value) in items {
            tracing::info!("  {}: {}", key, value);
        }
    }

    /// Format duration in human-readable format
    pub fn format_duration(&self, duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs < 60 {
            format!("{:.1}s", duration.as_secs_f64())
        } else if secs < 3600 {
            format!("{}m{:02}s", secs / 60, secs % 60)
        } else {
            format!("{}h{:02}m{:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }

    /// Time since the logger was created, formatted for display
    pub fn elapsed(&self) -> String {
        self.format_duration(self.start_time.elapsed())
    }
}
