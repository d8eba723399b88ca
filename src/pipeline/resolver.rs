//! Final decision once both digests are known.

use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use super::outcome::TransferOutcome;
use crate::errors::RelayError;
use crate::fs_ops::{Digest, io_hint, relocate_file};
use crate::utils::unique_destination;

/// Delete `source` when the digests match, otherwise move it to `quarantine`.
///
/// The copy at the destination is left alone either way. An existing file at
/// `quarantine` is never overwritten; the original gets a unique sibling name.
pub fn resolve(
    source: &Path,
    source_digest: &Digest,
    copy_digest: &Digest,
    quarantine: &Path,
) -> TransferOutcome {
    if source_digest == copy_digest {
        return match fs::remove_file(source) {
            Ok(()) => {
                info!(path = %source.display(), digest = source_digest.as_str(), "Copy verified; original removed");
                TransferOutcome::Verified {
                    source: source.to_path_buf(),
                    digest: source_digest.clone(),
                }
            }
            Err(e) => {
                error!(path = %source.display(), error = %e, hint = io_hint(&e).unwrap_or(""), "Could not remove verified original");
                TransferOutcome::Failed {
                    path: source.to_path_buf(),
                    error: RelayError::DeleteFailed {
                        path: source.to_path_buf(),
                        source: e,
                    },
                }
            }
        };
    }

    warn!(
        path = %source.display(),
        source_digest = source_digest.as_str(),
        copy_digest = copy_digest.as_str(),
        "Digest mismatch; quarantining original"
    );
    let target = unique_destination(quarantine);
    match relocate_file(source, &target) {
        Ok(()) => {
            warn!(from = %source.display(), to = %target.display(), "Original moved to quarantine");
            TransferOutcome::Quarantined {
                source: source.to_path_buf(),
                quarantined_to: target,
                source_digest: source_digest.clone(),
                copy_digest: copy_digest.clone(),
            }
        }
        Err(e) => {
            error!(from = %source.display(), to = %target.display(), error = %e, hint = io_hint(&e).unwrap_or(""), "Quarantine move failed");
            TransferOutcome::Failed {
                path: source.to_path_buf(),
                error: RelayError::MoveFailed {
                    from: source.to_path_buf(),
                    to: target,
                    source: e,
                },
            }
        }
    }
}
