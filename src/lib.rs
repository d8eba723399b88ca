//! Core library for `folder_relay`.
//!
//! Watches one directory, waits until each arriving file stops changing,
//! copies it with its metadata to a destination directory, compares MD5
//! digests, then deletes the original (match) or moves it to a quarantine
//! directory (mismatch).
//!
//! Module map:
//! - `config`: configuration types, XML loading, validation
//! - `events`: watcher events and the `EventSource` seam
//! - `fs_ops`: stability detection, copy, hashing, relocation
//! - `pipeline`: per-file state machine and the dispatch loop
//! - `platform`: OS-specific helpers (pid file, lock classification)

pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod fs_ops;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod shutdown;
mod utils;

pub use config::{Config, LogLevel, default_config_path, validate_and_normalize};
pub use errors::RelayError;
pub use events::{EventSource, NotifySource, SourcePoll, WatchEvent};
pub use fs_ops::{Digest, StabilityDetector, StabilityStrategy, copy_preserving_metadata, digest};
pub use pipeline::{Roots, TransferOutcome, TransferPipeline, TransferRequest, run_watch_loop};
