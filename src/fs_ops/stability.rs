//! Decide when a newly created file has stopped being written.
//!
//! A create notification fires as soon as the name appears, long before a
//! large copy into the watched directory finishes. Copying at that point
//! produces a truncated duplicate, so every transfer first waits here.
//!
//! Strategies:
//! - `SizePolling`: two consecutive equal length samples, and the file opens
//!   for reading. Correct for append-only writers; the default everywhere.
//! - `RenameProbe`: rename to a sibling and straight back. Succeeds as soon
//!   as no handle blocks the rename, which on Windows means no writer holds
//!   the file open. It says nothing about content, and on Unix renames
//!   almost never fail, so it is not a substitute for size polling.
//! - `Immediate`: no waiting, only confirms the path still exists.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::errors::RelayError;
use crate::platform::is_lock_contention;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StabilityStrategy {
    #[default]
    SizePolling,
    RenameProbe,
    Immediate,
}

impl StabilityStrategy {
    /// Parse user-facing names (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "size" | "size-polling" | "poll" => Some(StabilityStrategy::SizePolling),
            "rename" | "rename-probe" => Some(StabilityStrategy::RenameProbe),
            "immediate" | "none" => Some(StabilityStrategy::Immediate),
            _ => None,
        }
    }
}

impl fmt::Display for StabilityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StabilityStrategy::SizePolling => "size",
            StabilityStrategy::RenameProbe => "rename",
            StabilityStrategy::Immediate => "immediate",
        })
    }
}

/// Blocking stability check; the strategy is fixed at construction.
#[derive(Debug, Clone)]
pub struct StabilityDetector {
    strategy: StabilityStrategy,
    interval: Duration,
}

impl StabilityDetector {
    pub fn new(strategy: StabilityStrategy, interval: Duration) -> Self {
        Self { strategy, interval }
    }

    pub fn strategy(&self) -> StabilityStrategy {
        self.strategy
    }

    /// Block until `path` looks finished.
    ///
    /// `Ok(false)` once `timeout` has elapsed without confirmation. A file that
    /// disappears while being watched is `Err(SourceVanished)`.
    pub fn wait_until_stable(&self, path: &Path, timeout: Duration) -> Result<bool, RelayError> {
        match self.strategy {
            StabilityStrategy::SizePolling => self.poll_size(path, timeout),
            StabilityStrategy::RenameProbe => self.probe_rename(path, timeout),
            StabilityStrategy::Immediate => {
                file_len(path)?;
                Ok(true)
            }
        }
    }

    fn poll_size(&self, path: &Path, timeout: Duration) -> Result<bool, RelayError> {
        let start = Instant::now();
        let mut previous = file_len(path)?;
        loop {
            thread::sleep(self.interval);
            let current = file_len(path)?;
            trace!(path = %path.display(), previous, current, "size sample");
            if current == previous && is_readable(path)? {
                debug!(path = %path.display(), size = current, waited_ms = start.elapsed().as_millis() as u64, "size settled");
                return Ok(true);
            }
            if start.elapsed() >= timeout {
                debug!(path = %path.display(), size = current, "size still changing at timeout");
                return Ok(false);
            }
            previous = current;
        }
    }

    fn probe_rename(&self, path: &Path, timeout: Duration) -> Result<bool, RelayError> {
        let start = Instant::now();
        let sibling = probe_sibling(path);
        loop {
            match fs::rename(path, &sibling) {
                Ok(()) => {
                    fs::rename(&sibling, path).map_err(|source| RelayError::Io {
                        op: "restore name after rename probe",
                        path: sibling.clone(),
                        source,
                    })?;
                    debug!(path = %path.display(), waited_ms = start.elapsed().as_millis() as u64, "rename probe succeeded");
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(RelayError::SourceVanished(path.to_path_buf()));
                }
                Err(e) if is_lock_contention(&e) => {
                    trace!(path = %path.display(), error = %e, "still held by a writer");
                }
                Err(e) => return Err(RelayError::from_io("rename probe", path, e)),
            }
            if start.elapsed() >= timeout {
                debug!(path = %path.display(), "rename still blocked at timeout");
                return Ok(false);
            }
            thread::sleep(self.interval);
        }
    }
}

fn file_len(path: &Path) -> Result<u64, RelayError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| RelayError::from_io("stat", path, e))
}

/// A permission failure means "not yet"; a missing file is an error.
fn is_readable(path: &Path) -> Result<bool, RelayError> {
    match File::open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(RelayError::SourceVanished(path.to_path_buf()))
        }
        Err(_) => Ok(false),
    }
}

fn probe_sibling(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(
        ".{}.{}.probe",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    path.with_file_name(name)
}
