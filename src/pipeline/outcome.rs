use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::RelayError;
use crate::fs_ops::Digest;

/// Terminal result of one pipeline pass.
#[derive(Debug)]
pub enum TransferOutcome {
    /// Copy matched; the original was deleted.
    Verified { source: PathBuf, digest: Digest },
    /// Copy did not match; the original now lives in quarantine.
    Quarantined {
        source: PathBuf,
        quarantined_to: PathBuf,
        source_digest: Digest,
        copy_digest: Digest,
    },
    /// Nothing was done (gone, not a file, or the copy did not land).
    Skipped { path: PathBuf, reason: String },
    TimedOut { path: PathBuf, waited: Duration },
    Failed { path: PathBuf, error: RelayError },
}

impl TransferOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            TransferOutcome::Verified { .. } => "verified",
            TransferOutcome::Quarantined { .. } => "quarantined",
            TransferOutcome::Skipped { .. } => "skipped",
            TransferOutcome::TimedOut { .. } => "timed_out",
            TransferOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, TransferOutcome::Verified { .. })
    }

    pub fn is_quarantined(&self) -> bool {
        matches!(self, TransferOutcome::Quarantined { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TransferOutcome::Skipped { .. })
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Verified { source, digest } => {
                write!(f, "verified {} (md5 {digest})", source.display())
            }
            TransferOutcome::Quarantined {
                source,
                quarantined_to,
                source_digest,
                copy_digest,
            } => write!(
                f,
                "quarantined {} -> {} (source md5 {source_digest}, copy md5 {copy_digest})",
                source.display(),
                quarantined_to.display()
            ),
            TransferOutcome::Skipped { path, reason } => {
                write!(f, "skipped {}: {reason}", path.display())
            }
            TransferOutcome::TimedOut { path, waited } => {
                write!(f, "{} still changing after {}s", path.display(), waited.as_secs())
            }
            TransferOutcome::Failed { path, error } => {
                write!(f, "failed {}: {error}", path.display())
            }
        }
    }
}
