//! Config validation logic.
//! Verifies the three roots exist and are directories, probes access, and
//! canonicalizes them so watcher paths can be made root-relative.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::errors::RelayError;
use crate::utils::is_writable_probe;

use super::types::Config;

/// Validate the configured roots and rewrite them to canonical absolute paths.
///
/// Every failure is a `RelayError::ConfigInvalid` wrapped in anyhow so the
/// caller can report a code and exit before any watching starts.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<()> {
    let watch = ensure_dir("watch_path", &cfg.watch_base)?;
    let copy = ensure_dir("copy_to_path", &cfg.copy_base)?;
    let quarantine = ensure_dir("backup_path", &cfg.quarantine_base)?;

    fs::read_dir(&watch).map_err(|e| invalid("watch_path", format!("cannot read '{}': {e}", watch.display())))?;
    debug!(path = %watch.display(), "watch_path readable");
    for (name, dir) in [("copy_to_path", &copy), ("backup_path", &quarantine)] {
        is_writable_probe(dir)
            .map_err(|e| invalid(name, format!("cannot write to '{}': {e}", dir.display())))?;
        debug!(path = %dir.display(), "{name} writable");
    }

    // Roots must be distinct, and nothing we write may land back inside the
    // watched tree or the watcher would feed on its own output.
    if copy == quarantine {
        return Err(invalid(
            "backup_path",
            format!("copy_to_path and backup_path resolve to the same path: '{}'", copy.display()),
        ));
    }
    for (name, dir) in [("copy_to_path", &copy), ("backup_path", &quarantine)] {
        if *dir == watch {
            return Err(invalid(
                name,
                format!("{name} and watch_path resolve to the same path: '{}'", dir.display()),
            ));
        }
        if dir.starts_with(&watch) {
            return Err(invalid(
                name,
                format!(
                    "{name} '{}' must not be inside watch_path '{}'",
                    dir.display(),
                    watch.display()
                ),
            ));
        }
    }

    cfg.watch_base = watch;
    cfg.copy_base = copy;
    cfg.quarantine_base = quarantine;
    info!(
        watch = %cfg.watch_base.display(),
        copy = %cfg.copy_base.display(),
        backup = %cfg.quarantine_base.display(),
        "Config validated"
    );
    Ok(())
}

fn invalid(field: &'static str, reason: String) -> anyhow::Error {
    error!(field, %reason, "invalid configuration");
    RelayError::ConfigInvalid { field, reason }.into()
}

/// Path must be set, exist and be a directory; returns its canonical form.
fn ensure_dir(field: &'static str, path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(invalid(field, "not set".into()));
    }
    if !path.exists() {
        return Err(invalid(field, format!("'{}' does not exist", path.display())));
    }
    if !path.is_dir() {
        return Err(invalid(field, format!("'{}' is not a directory", path.display())));
    }
    dunce::canonicalize(path).with_context(|| format!("canonicalize {field} '{}'", path.display()))
}
