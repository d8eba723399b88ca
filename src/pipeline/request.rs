//! Path derivation for one transfer.

use std::path::{Path, PathBuf};

use crate::config::Config;

/// The three directory roots a pipeline works between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    pub watch: PathBuf,
    pub copy_to: PathBuf,
    pub quarantine: PathBuf,
}

impl Roots {
    pub fn new(
        watch: impl Into<PathBuf>,
        copy_to: impl Into<PathBuf>,
        quarantine: impl Into<PathBuf>,
    ) -> Self {
        Self {
            watch: watch.into(),
            copy_to: copy_to.into(),
            quarantine: quarantine.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.watch_base, &cfg.copy_base, &cfg.quarantine_base)
    }
}

/// Where one arriving file comes from and the two places it may end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub quarantine: PathBuf,
}

impl TransferRequest {
    /// Build the request for `path` reported under `roots.watch`.
    ///
    /// The watch-relative part of `path` is reused under both other roots, so
    /// `watch/a/b.bin` maps to `copy_to/a/b.bin` and `quarantine/a/b.bin`. A
    /// path outside the watch root keeps only its file name. `None` when the
    /// path has no file name at all (e.g. `/` or `..`).
    pub fn for_path(roots: &Roots, path: &Path) -> Option<Self> {
        let relative = match path.strip_prefix(&roots.watch) {
            Ok(rel) if rel.file_name().is_some() => rel.to_path_buf(),
            _ => PathBuf::from(path.file_name()?),
        };
        Some(Self {
            source: path.to_path_buf(),
            destination: roots.copy_to.join(&relative),
            quarantine: roots.quarantine.join(&relative),
        })
    }
}
