//! Typed error definitions for folder_relay.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid configuration for {field}: {reason}")]
    ConfigInvalid { field: &'static str, reason: String },

    #[error("File {path} did not stabilize within {}s", waited.as_secs())]
    StabilityTimeout { path: PathBuf, waited: Duration },

    #[error("Source vanished before it could be handled: {0}")]
    SourceVanished(PathBuf),

    #[error("Copy to {destination} could not be verified: {reason}")]
    CopyVerificationFailed { destination: PathBuf, reason: String },

    #[error("Failed to read {path} for hashing: {source}")]
    HashReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to delete verified original {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {from} into quarantine at {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{op} '{}': {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Event source failure: {0}")]
    EventSource(String),
}

impl RelayError {
    /// Stable numeric code for logs and exit statuses.
    pub fn code(&self) -> i32 {
        match self {
            RelayError::ConfigInvalid { .. } => 2,
            RelayError::StabilityTimeout { .. } => 10,
            RelayError::SourceVanished(_) => 11,
            RelayError::CopyVerificationFailed { .. } => 12,
            RelayError::HashReadFailure { .. } => 13,
            RelayError::DeleteFailed { .. } => 14,
            RelayError::MoveFailed { .. } => 15,
            RelayError::Io { .. } => 16,
            RelayError::EventSource(_) => 20,
        }
    }

    /// Short snake_case tag used as the `kind` field in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::ConfigInvalid { .. } => "config_invalid",
            RelayError::StabilityTimeout { .. } => "stability_timeout",
            RelayError::SourceVanished(_) => "source_vanished",
            RelayError::CopyVerificationFailed { .. } => "copy_verification_failed",
            RelayError::HashReadFailure { .. } => "hash_read_failure",
            RelayError::DeleteFailed { .. } => "delete_failed",
            RelayError::MoveFailed { .. } => "move_failed",
            RelayError::Io { .. } => "io",
            RelayError::EventSource(_) => "event_source",
        }
    }

    /// Wrap an io::Error for `path`, mapping NotFound to `SourceVanished`.
    pub(crate) fn from_io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            RelayError::SourceVanished(path)
        } else {
            RelayError::Io { op, path, source }
        }
    }
}
