//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug and wins over it.
//! - Flags left unset keep the value from config.xml (or the default).

use clap::{Parser, ValueHint};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::types::{Config, LogLevel};
use crate::fs_ops::StabilityStrategy;

/// Watch a folder, copy each finished file elsewhere, verify by MD5,
/// then delete the original or move it to a backup folder.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Relay finished files from a watched folder, verified by MD5")]
pub struct Args {
    /// Directory to watch for arriving files.
    #[arg(short = 'w', long, value_hint = ValueHint::DirPath)]
    pub watch_path: Option<PathBuf>,

    /// Directory receiving the verified copies.
    #[arg(short = 'c', long, value_hint = ValueHint::DirPath)]
    pub copy_to_path: Option<PathBuf>,

    /// Quarantine directory for originals whose copy did not verify.
    #[arg(short = 'b', long, value_hint = ValueHint::DirPath)]
    pub backup_path: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<LogLevel>,

    /// Directory for the daily rotated log files.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub log_dir: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// How to decide a file has finished being written: size or rename.
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<StabilityStrategy>,

    /// Give up on a file still being written after this many seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Milliseconds between two size samples.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: Option<u64>,

    /// Where to write the process id.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub pid_file: Option<PathBuf>,

    /// Print where folder_relay will look for the config file, then exit.
    #[arg(long, help = "Print the config file location used by folder_relay and exit")]
    pub print_config: bool,

    /// Write a template config.xml at the default location, then exit.
    #[arg(long, help = "Create a template config file and exit")]
    pub init_config: bool,
}

fn parse_strategy(s: &str) -> Result<StabilityStrategy, String> {
    match StabilityStrategy::parse(s) {
        Some(StabilityStrategy::Immediate) | None => {
            Err(format!("invalid strategy '{s}' (expected: size, rename)"))
        }
        Some(strategy) => Ok(strategy),
    }
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(p) = &self.watch_path {
            cfg.watch_base = p.clone();
        }
        if let Some(p) = &self.copy_to_path {
            cfg.copy_base = p.clone();
        }
        if let Some(p) = &self.backup_path {
            cfg.quarantine_base = p.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(dir) = &self.log_dir {
            cfg.log_dir = Some(dir.clone());
        }
        if self.json {
            cfg.json = true;
        }
        if let Some(strategy) = self.strategy {
            cfg.stability = strategy;
        }
        if let Some(secs) = self.timeout_secs {
            cfg.stability_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.poll_interval_ms {
            cfg.poll_interval = Duration::from_millis(ms);
        }
        if let Some(p) = &self.pid_file {
            cfg.pid_file = Some(p.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
