//! One pass per arriving file: stability, copy, hash both sides, resolve.
//!
//! Every stage is a public method so callers (and tests) can drive the pass
//! step by step; `process` is the normal entry point and never returns an
//! error. Per-file failures become a `TransferOutcome` and are logged here.

use std::time::Duration;
use tracing::{Span, debug, error, info, info_span, warn};

use super::outcome::TransferOutcome;
use super::request::{Roots, TransferRequest};
use super::resolver;
use crate::config::Config;
use crate::errors::RelayError;
use crate::events::WatchEvent;
use crate::fs_ops::{Digest, StabilityDetector, copy_preserving_metadata, digest};

#[derive(Debug)]
pub struct TransferPipeline {
    roots: Roots,
    detector: StabilityDetector,
    stability_timeout: Duration,
    span: Span,
}

impl TransferPipeline {
    pub fn new(roots: Roots, detector: StabilityDetector, stability_timeout: Duration) -> Self {
        let span = info_span!(
            "relay",
            watch = %roots.watch.display(),
            strategy = %detector.strategy()
        );
        Self {
            roots,
            detector,
            stability_timeout,
            span,
        }
    }

    /// Pipeline over the configured roots. Expects a validated config.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            Roots::from_config(cfg),
            StabilityDetector::new(cfg.stability, cfg.poll_interval),
            cfg.stability_timeout,
        )
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    /// React to one watcher event. Only `Created` runs a transfer; the other
    /// kinds are logged and yield `None`.
    pub fn handle(&self, event: &WatchEvent) -> Option<TransferOutcome> {
        let _entered = self.span.enter();
        match event {
            WatchEvent::Created { path } => {
                info!(event = event.kind(), path = %event.path().display(), "Event received");
                match TransferRequest::for_path(&self.roots, path) {
                    Some(req) => Some(self.process(&req)),
                    None => {
                        let outcome = TransferOutcome::Skipped {
                            path: path.clone(),
                            reason: "path has no file name".into(),
                        };
                        log_outcome(&outcome);
                        Some(outcome)
                    }
                }
            }
            WatchEvent::Modified { .. } => {
                debug!(event = event.kind(), path = %event.path().display(), "Event received");
                None
            }
            WatchEvent::Deleted { .. } => {
                info!(event = event.kind(), path = %event.path().display(), "Event received");
                None
            }
            WatchEvent::Moved { from, .. } => {
                info!(event = event.kind(), from = %from.display(), to = %event.path().display(), "Event received");
                None
            }
        }
    }

    /// Run the whole pass for `req` and log its outcome.
    pub fn process(&self, req: &TransferRequest) -> TransferOutcome {
        let _entered = self.span.enter();
        let outcome = self.run(req);
        log_outcome(&outcome);
        outcome
    }

    fn run(&self, req: &TransferRequest) -> TransferOutcome {
        if req.source.is_dir() {
            return TransferOutcome::Skipped {
                path: req.source.clone(),
                reason: "directory; nothing to copy".into(),
            };
        }

        match self.await_stability(&req.source) {
            Ok(true) => {}
            Ok(false) => {
                return TransferOutcome::TimedOut {
                    path: req.source.clone(),
                    waited: self.stability_timeout,
                };
            }
            Err(RelayError::SourceVanished(path)) => {
                return TransferOutcome::Skipped {
                    path,
                    reason: "vanished while waiting for writes to finish".into(),
                };
            }
            Err(error) => return failed(req, error),
        }

        match self.transfer(req) {
            Ok(true) => {}
            Ok(false) => {
                let err = RelayError::CopyVerificationFailed {
                    destination: req.destination.clone(),
                    reason: "source missing or copy did not land at the destination".into(),
                };
                return TransferOutcome::Skipped {
                    path: req.source.clone(),
                    reason: err.to_string(),
                };
            }
            Err(error) => return failed(req, error),
        }

        self.verify_and_resolve(req)
    }

    /// Wait until writes to `path` have finished, within the configured budget.
    pub fn await_stability(&self, path: &std::path::Path) -> Result<bool, RelayError> {
        let stable = self.detector.wait_until_stable(path, self.stability_timeout)?;
        if stable {
            info!(path = %path.display(), "File is stable");
        } else {
            warn!(path = %path.display(), timeout_secs = self.stability_timeout.as_secs(), "File did not stabilize in time");
        }
        Ok(stable)
    }

    /// Copy source to destination with metadata.
    pub fn transfer(&self, req: &TransferRequest) -> Result<bool, RelayError> {
        let copied = copy_preserving_metadata(&req.source, &req.destination)?;
        if copied {
            info!(source = %req.source.display(), dest = %req.destination.display(), "Copied");
        } else {
            warn!(source = %req.source.display(), dest = %req.destination.display(), "Copy not performed");
        }
        Ok(copied)
    }

    /// Digest the source, then the copy.
    pub fn hash_pair(&self, req: &TransferRequest) -> Result<(Digest, Digest), RelayError> {
        let source_digest = digest(&req.source)?;
        let copy_digest = digest(&req.destination)?;
        Ok((source_digest, copy_digest))
    }

    /// Hash both sides of a finished copy and settle the original. A digest
    /// that cannot be read fails the pass and leaves the original in place.
    pub fn verify_and_resolve(&self, req: &TransferRequest) -> TransferOutcome {
        match self.hash_pair(req) {
            Ok((source_digest, copy_digest)) => self.resolve(req, &source_digest, &copy_digest),
            Err(error) => failed(req, error),
        }
    }

    pub fn resolve(
        &self,
        req: &TransferRequest,
        source_digest: &Digest,
        copy_digest: &Digest,
    ) -> TransferOutcome {
        resolver::resolve(&req.source, source_digest, copy_digest, &req.quarantine)
    }
}

fn failed(req: &TransferRequest, error: RelayError) -> TransferOutcome {
    TransferOutcome::Failed {
        path: req.source.clone(),
        error,
    }
}

fn log_outcome(outcome: &TransferOutcome) {
    let kind = outcome.kind();
    match outcome {
        TransferOutcome::Verified { .. } => info!(outcome = kind, "{outcome}"),
        TransferOutcome::Quarantined { .. } | TransferOutcome::Skipped { .. } => {
            warn!(outcome = kind, "{outcome}")
        }
        TransferOutcome::TimedOut { path, waited } => {
            let err = RelayError::StabilityTimeout {
                path: path.clone(),
                waited: *waited,
            };
            warn!(outcome = kind, code = err.code(), kind = err.kind(), "{err}")
        }
        TransferOutcome::Failed { error, .. } => {
            error!(outcome = kind, code = error.code(), kind = error.kind(), "{outcome}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::StabilityStrategy;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn setup() -> (TempDir, TransferPipeline) {
        let td = tempdir().unwrap();
        for d in ["in", "out", "bad"] {
            fs::create_dir(td.path().join(d)).unwrap();
        }
        let roots = Roots::new(td.path().join("in"), td.path().join("out"), td.path().join("bad"));
        let det = StabilityDetector::new(StabilityStrategy::Immediate, Duration::from_millis(10));
        let p = TransferPipeline::new(roots, det, Duration::from_secs(1));
        (td, p)
    }

    #[test]
    fn created_file_is_verified_and_removed() {
        let (td, p) = setup();
        let src = td.path().join("in").join("a.txt");
        fs::write(&src, b"payload").unwrap();
        let out = p.handle(&WatchEvent::Created { path: src.clone() }).unwrap();
        assert!(out.is_verified(), "{out}");
        assert!(!src.exists());
        assert_eq!(fs::read(td.path().join("out").join("a.txt")).unwrap(), b"payload");
    }

    #[test]
    fn other_events_do_not_transfer() {
        let (td, p) = setup();
        let src = td.path().join("in").join("a.txt");
        fs::write(&src, b"payload").unwrap();
        assert!(p.handle(&WatchEvent::Modified { path: src.clone() }).is_none());
        assert!(p.handle(&WatchEvent::Deleted { path: src.clone() }).is_none());
        assert!(p
            .handle(&WatchEvent::Moved { from: src.clone(), to: src.clone() })
            .is_none());
        assert!(src.exists());
        assert!(!td.path().join("out").join("a.txt").exists());
    }

    #[test]
    fn directory_is_skipped() {
        let (td, p) = setup();
        let dir = td.path().join("in").join("sub");
        fs::create_dir(&dir).unwrap();
        let out = p.handle(&WatchEvent::Created { path: dir.clone() }).unwrap();
        assert!(out.is_skipped(), "{out}");
        assert!(dir.is_dir());
    }

    #[test]
    fn missing_source_is_skipped() {
        let (td, p) = setup();
        let out = p
            .handle(&WatchEvent::Created { path: td.path().join("in").join("gone") })
            .unwrap();
        assert!(out.is_skipped(), "{out}");
        assert_eq!(fs::read_dir(td.path().join("out")).unwrap().count(), 0);
    }

    #[test]
    fn stages_compose_like_process() {
        let (td, p) = setup();
        let src = td.path().join("in").join("s.bin");
        fs::write(&src, vec![1u8; 1000]).unwrap();
        let req = TransferRequest::for_path(p.roots(), &src).unwrap();
        assert!(p.await_stability(Path::new(&req.source)).unwrap());
        assert!(p.transfer(&req).unwrap());
        let (a, b) = p.hash_pair(&req).unwrap();
        assert_eq!(a, b);
        assert!(p.resolve(&req, &a, &b).is_verified());
    }

    #[test]
    fn unreadable_copy_fails_and_keeps_original() {
        let (td, p) = setup();
        let src = td.path().join("in").join("h.bin");
        fs::write(&src, b"hash me").unwrap();
        let req = TransferRequest::for_path(p.roots(), &src).unwrap();
        assert!(p.transfer(&req).unwrap());
        fs::remove_file(&req.destination).unwrap();

        let out = p.verify_and_resolve(&req);
        assert!(
            matches!(out, TransferOutcome::Failed { error: RelayError::HashReadFailure { .. }, .. }),
            "{out}"
        );
        assert_eq!(fs::read(&src).unwrap(), b"hash me");
        assert_eq!(fs::read_dir(td.path().join("bad")).unwrap().count(), 0);
    }
}
