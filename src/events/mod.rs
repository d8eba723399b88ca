//! Filesystem notifications as the pipeline sees them.
//!
//! `EventSource` is the only thing the dispatch loop needs from a watcher:
//! block for a while, hand back the next event. `NotifySource` implements it
//! on top of the OS watcher; a plain `mpsc::Receiver<WatchEvent>` implements
//! it for in-process producers and tests.

mod notify_source;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::errors::RelayError;

pub use notify_source::NotifySource;

/// One filesystem change under the watched root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created { path: PathBuf },
    Modified { path: PathBuf },
    Deleted { path: PathBuf },
    Moved { from: PathBuf, to: PathBuf },
}

impl WatchEvent {
    /// Path the event is about (the new name for a move).
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created { path }
            | WatchEvent::Modified { path }
            | WatchEvent::Deleted { path } => path,
            WatchEvent::Moved { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WatchEvent::Created { .. } => "created",
            WatchEvent::Modified { .. } => "modified",
            WatchEvent::Deleted { .. } => "deleted",
            WatchEvent::Moved { .. } => "moved",
        }
    }
}

/// Result of waiting on an event source.
#[derive(Debug)]
pub enum SourcePoll {
    Event(WatchEvent),
    /// Nothing arrived within the wait.
    Idle,
    /// The producer is gone; no further events will come.
    Closed,
}

pub trait EventSource {
    /// Wait up to `wait` for the next event.
    fn next_event(&mut self, wait: Duration) -> Result<SourcePoll, RelayError>;
}

impl EventSource for Receiver<WatchEvent> {
    fn next_event(&mut self, wait: Duration) -> Result<SourcePoll, RelayError> {
        match self.recv_timeout(wait) {
            Ok(ev) => Ok(SourcePoll::Event(ev)),
            Err(RecvTimeoutError::Timeout) => Ok(SourcePoll::Idle),
            Err(RecvTimeoutError::Disconnected) => Ok(SourcePoll::Closed),
        }
    }
}
