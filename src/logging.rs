//! Tracing initialization.
//! Builds a subscriber with a console layer and an optional daily-rotated file layer.
//!
//! Behavior:
//! - Console level is driven by LogLevel (no RUST_LOG override here).
//! - JSON/compact console formatting is selected via the `json` flag.
//! - The file layer writes `log.YYYY-MM-DD.log` under the log directory and
//!   always records DEBUG, whatever the console level.
//!
//! Implementation notes:
//! - File logging uses tracing_appender::non_blocking to avoid blocking on I/O.
//! - We refuse file logging if any ancestor of the log directory is a symlink.

use anyhow::Result;
use chrono::Local;
use folder_relay::output as out;
use folder_relay::{Config, LogLevel, config::path_has_symlink_ancestor};
use std::fmt as stdfmt;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_PREFIX: &str = "log";
const LOG_FILE_SUFFIX: &str = "log";

/// Local timestamp, `YYYY-MM-DD HH:MM:SS`.
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

#[inline]
fn env_filter_from_level(level_filter: LevelFilter) -> EnvFilter {
    let level_str = match level_filter {
        LevelFilter::ERROR => "error",
        LevelFilter::WARN => "warn",
        LevelFilter::INFO => "info",
        LevelFilter::DEBUG => "debug",
        LevelFilter::TRACE => "trace",
        _ => "info",
    };
    EnvFilter::new(level_str)
}

/// Open a non-blocking daily-rotating writer in `dir`:
/// - Refuse if any ancestor is a symlink
/// - Create the directory if missing
fn open_rolling_writer(dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(dir) {
        Ok(true) => {
            out::print_warn(&format!(
                "Refusing to enable file logging: ancestor of {} is a symlink; logging to stdout only.",
                dir.display()
            ));
            return None;
        }
        Err(e) => {
            out::print_warn(&format!(
                "Could not check log directory {} for symlinks ({e}); logging to stdout only.",
                dir.display()
            ));
            return None;
        }
        Ok(false) => {}
    }

    if let Err(e) = std::fs::create_dir_all(dir) {
        out::print_warn(&format!("Could not create log directory {}: {e}", dir.display()));
        return None;
    }

    match Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
    {
        Ok(appender) => Some(tracing_appender::non_blocking(appender)),
        Err(e) => {
            out::print_warn(&format!("Failed to open log files in {}: {e}", dir.display()));
            None
        }
    }
}

/// Initialize tracing from the config. Returns the WorkerGuard of the file
/// layer when one was created; it must be held until shutdown to flush logs.
pub fn init_tracing(cfg: &Config, json: bool) -> Result<Option<WorkerGuard>> {
    let console_level = to_level_filter(cfg.log_level);

    let console = if json {
        tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_timer(LocalHumanTime)
            .with_target(true)
            .with_line_number(true)
            .with_filter(env_filter_from_level(console_level))
            .boxed()
    } else {
        tsfmt::layer()
            .with_timer(LocalHumanTime)
            .with_target(true)
            .with_line_number(true)
            .compact()
            .with_filter(env_filter_from_level(console_level))
            .boxed()
    };

    let (file_layer, guard) = match cfg.log_dir.as_deref().and_then(open_rolling_writer) {
        Some((writer, guard)) => {
            let file_level = std::cmp::max(LevelFilter::DEBUG, console_level);
            let layer = if json {
                tsfmt::layer()
                    .event_format(tsfmt::format().json())
                    .with_timer(LocalHumanTime)
                    .with_target(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_level)
                    .boxed()
            } else {
                tsfmt::layer()
                    .with_timer(LocalHumanTime)
                    .with_target(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_level)
                    .boxed()
            };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    registry().with(console).with(file_layer).try_init()?;
    Ok(guard)
}
