//! OS-backed event source using the `notify` crate (inotify, FSEvents,
//! ReadDirectoryChangesW, or its polling fallback).
//!
//! Renames need care. inotify reports a rename inside the tree three times
//! (From, To, and a paired Both); we keep only Both as a `Moved`. A To with no
//! matching From is a file moved in from outside the tree, which is an
//! arrival just like a create. A From whose To never shows up within
//! `RENAME_PAIR_WINDOW` left the tree and is reported as `Deleted`.

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{info, trace};

use super::{EventSource, SourcePoll, WatchEvent};
use crate::errors::RelayError;

const REMEMBERED_RENAMES: usize = 256;
/// inotify queues both halves of a rename together; this is generous.
const RENAME_PAIR_WINDOW: Duration = Duration::from_millis(500);

/// Recursive watcher over one root.
pub struct NotifySource {
    // Dropping the watcher stops delivery.
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    pending: VecDeque<WatchEvent>,
    renames: RenameTracker,
}

impl NotifySource {
    /// Start watching `root` recursively.
    pub fn watch(root: &Path) -> Result<Self, RelayError> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means we are shutting down.
            let _ = tx.send(res);
        })
        .map_err(|e| RelayError::EventSource(format!("create watcher: {e}")))?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| RelayError::EventSource(format!("watch '{}': {e}", root.display())))?;
        info!(root = %root.display(), "Watching directory");
        Ok(Self {
            _watcher: watcher,
            rx,
            pending: VecDeque::new(),
            renames: RenameTracker::default(),
        })
    }
}

impl EventSource for NotifySource {
    fn next_event(&mut self, wait: Duration) -> Result<SourcePoll, RelayError> {
        let deadline = Instant::now() + wait;
        loop {
            let now = Instant::now();
            self.pending.extend(self.renames.expire(now));
            if let Some(ev) = self.pending.pop_front() {
                return Ok(SourcePoll::Event(ev));
            }
            if now >= deadline {
                return Ok(SourcePoll::Idle);
            }
            let mut remaining = deadline - now;
            if let Some(due) = self.renames.next_expiry() {
                remaining = remaining.min(due.saturating_duration_since(now));
            }
            match self.rx.recv_timeout(remaining) {
                Ok(Ok(raw)) => {
                    trace!(?raw, "raw notify event");
                    let translated = self.renames.translate(raw, Instant::now());
                    self.pending.extend(translated);
                }
                Ok(Err(e)) => return Err(RelayError::EventSource(e.to_string())),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(SourcePoll::Closed),
            }
        }
    }
}

/// Remembers rename-from halves so the matching rename-to is not mistaken
/// for an arrival, and so a half that is never matched can be reported.
#[derive(Default)]
struct RenameTracker {
    unmatched: VecDeque<PendingFrom>,
}

struct PendingFrom {
    cookie: usize,
    path: PathBuf,
    seen: Instant,
}

impl RenameTracker {
    /// Track a rename-from; returns the oldest entry as `Deleted` when full.
    fn remember(&mut self, cookie: usize, path: PathBuf, seen: Instant) -> Option<WatchEvent> {
        let evicted = if self.unmatched.len() == REMEMBERED_RENAMES {
            self.unmatched
                .pop_front()
                .map(|old| WatchEvent::Deleted { path: old.path })
        } else {
            None
        };
        self.unmatched.push_back(PendingFrom { cookie, path, seen });
        evicted
    }

    fn take(&mut self, cookie: usize) -> bool {
        match self.unmatched.iter().position(|p| p.cookie == cookie) {
            Some(i) => {
                self.unmatched.remove(i);
                true
            }
            None => false,
        }
    }

    /// Rename-from halves older than the pairing window moved out of the tree.
    fn expire(&mut self, now: Instant) -> Vec<WatchEvent> {
        let mut gone = Vec::new();
        while let Some(front) = self.unmatched.front() {
            if now.saturating_duration_since(front.seen) < RENAME_PAIR_WINDOW {
                break;
            }
            if let Some(old) = self.unmatched.pop_front() {
                gone.push(WatchEvent::Deleted { path: old.path });
            }
        }
        gone
    }

    fn next_expiry(&self) -> Option<Instant> {
        self.unmatched.front().map(|p| p.seen + RENAME_PAIR_WINDOW)
    }

    fn translate(&mut self, event: Event, now: Instant) -> Vec<WatchEvent> {
        let cookie = event.attrs.tracker();
        let mut paths = event.paths;
        match event.kind {
            EventKind::Create(_) => paths.into_iter().map(|path| WatchEvent::Created { path }).collect(),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() >= 2 => {
                let to = paths.swap_remove(1);
                let from = paths.swap_remove(0);
                vec![WatchEvent::Moved { from, to }]
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => match cookie {
                Some(c) => paths
                    .into_iter()
                    .filter_map(|path| self.remember(c, path, now))
                    .collect(),
                // Without a cookie the other half can never be matched.
                None => paths.into_iter().map(|path| WatchEvent::Deleted { path }).collect(),
            },
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                if cookie.is_some_and(|c| self.take(c)) {
                    Vec::new()
                } else {
                    paths.into_iter().map(|path| WatchEvent::Created { path }).collect()
                }
            }
            EventKind::Modify(ModifyKind::Name(_)) => Vec::new(),
            EventKind::Modify(_) => paths.into_iter().map(|path| WatchEvent::Modified { path }).collect(),
            EventKind::Remove(_) => paths.into_iter().map(|path| WatchEvent::Deleted { path }).collect(),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
        }
    }
}
