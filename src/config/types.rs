//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::paths;
use super::{PID_FILE_NAME, POLL_INTERVAL_DEFAULT, STABILITY_TIMEOUT_DEFAULT};
use crate::fs_ops::StabilityStrategy;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for the watcher.
///
/// The three roots have no defaults: an empty path means "not configured" and
/// is rejected by [`super::validate_and_normalize`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory watched (recursively) for arriving files
    pub watch_base: PathBuf,
    /// Where verified copies land
    pub copy_base: PathBuf,
    /// Where originals go when the copy does not match
    pub quarantine_base: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Directory for the daily rotated log files
    pub log_dir: Option<PathBuf>,
    /// File receiving our process id at startup
    pub pid_file: Option<PathBuf>,
    /// How to decide a file is no longer being written
    pub stability: StabilityStrategy,
    /// Give up on a file that is still changing after this long
    pub stability_timeout: Duration,
    /// Gap between stability samples
    pub poll_interval: Duration,
    /// Emit JSON log lines instead of compact text
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_base: PathBuf::new(),
            copy_base: PathBuf::new(),
            quarantine_base: PathBuf::new(),
            log_level: LogLevel::Normal,
            log_dir: paths::default_log_dir(),
            pid_file: Some(PathBuf::from(PID_FILE_NAME)),
            stability: StabilityStrategy::default(),
            stability_timeout: STABILITY_TIMEOUT_DEFAULT,
            poll_interval: POLL_INTERVAL_DEFAULT,
            json: false,
        }
    }
}

impl Config {
    /// Construct a Config with explicit roots; other fields use defaults.
    pub fn new(
        watch_base: impl Into<PathBuf>,
        copy_base: impl Into<PathBuf>,
        quarantine_base: impl Into<PathBuf>,
    ) -> Self {
        Self {
            watch_base: watch_base.into(),
            copy_base: copy_base.into(),
            quarantine_base: quarantine_base.into(),
            ..Default::default()
        }
    }
}
