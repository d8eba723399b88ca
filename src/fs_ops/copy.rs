//! Metadata-preserving copy with landing verification.
//! - Copies to a temp file in the destination directory
//! - Ensures data durability (io_copy::copy_streaming fsyncs the temp file)
//! - Applies source timestamps/permissions to the temp file
//! - Atomically renames temp -> dest and confirms a regular file sits at `dest`

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use super::atomic::try_atomic_move;
use super::{io_copy, metadata, util};
use crate::errors::RelayError;

/// Copy `src` to a temp sibling of `dest`, carry metadata over, then rename
/// into place. Returns the number of bytes copied.
pub(super) fn safe_copy_and_rename(src: &Path, dest: &Path, src_meta: &fs::Metadata) -> io::Result<u64> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"))?;
    fs::create_dir_all(dest_dir)?;

    let tmp_path = util::unique_temp_path(dest_dir);
    let bytes = match io_copy::copy_streaming(src, &tmp_path) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    };
    metadata::preserve_metadata(src, &tmp_path, src_meta);

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(bytes)
}

/// Copy `source` to `destination` keeping timestamps and permission bits.
///
/// Returns `Ok(false)` without touching anything when the source is gone (or
/// is not a regular file) and when the destination is an existing directory.
/// Returns `Ok(false)` after copying if no regular file is found at
/// `destination`. Symlinks at the source are followed.
pub fn copy_preserving_metadata(source: &Path, destination: &Path) -> Result<bool, RelayError> {
    let src_meta = match fs::metadata(source) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %source.display(), "source vanished before copy");
            return Ok(false);
        }
        Err(e) => return Err(RelayError::from_io("stat source", source, e)),
    };
    if !src_meta.is_file() {
        warn!(path = %source.display(), "source is not a regular file; nothing to copy");
        return Ok(false);
    }
    if destination.is_dir() {
        warn!(dest = %destination.display(), "destination is a directory; refusing to copy into it");
        return Ok(false);
    }

    let bytes = match safe_copy_and_rename(source, destination, &src_meta) {
        Ok(r) => r,
        Err(e) if e.kind() == io::ErrorKind::NotFound && !source.exists() => {
            warn!(path = %source.display(), "source vanished during copy");
            return Ok(false);
        }
        Err(e) => return Err(RelayError::from_io("copy", destination, e)),
    };

    match fs::metadata(destination) {
        Ok(m) if m.is_file() => {}
        _ => {
            warn!(dest = %destination.display(), "copy missing at destination after rename");
            return Ok(false);
        }
    }

    debug!(src = %source.display(), dest = %destination.display(), bytes, "copy landed");
    Ok(true)
}
