//! Move a file to a new home, across filesystems if necessary.
//! Rename first; on EXDEV fall back to safe copy + metadata + remove.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use super::atomic::try_atomic_move;
use super::copy::safe_copy_and_rename;
use super::util::is_cross_device;

/// Move `src` to `dest`, creating `dest`'s parent directory.
/// The original is removed only after the copy is in place.
pub fn relocate_file(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    match try_atomic_move(src, dest) {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dest.display(), "renamed");
            Ok(())
        }
        Err(e) if is_cross_device(&e) => {
            warn!(src = %src.display(), dest = %dest.display(), "cross-filesystem move; copying instead");
            let meta = fs::metadata(src)?;
            safe_copy_and_rename(src, dest, &meta)?;
            fs::remove_file(src)
        }
        Err(e) => Err(e),
    }
}
