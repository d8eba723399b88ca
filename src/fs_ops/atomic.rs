//! Atomic rename helper.
//! - On Windows, removes an existing destination file first (rename doesn’t overwrite there).
//! - On Unix, best-effort fsync of the destination directory after rename.

use std::fs;
use std::io;
use std::path::Path;

pub(super) fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if dst.is_file() {
            if let Err(e) = fs::remove_file(dst) {
                if e.kind() != io::ErrorKind::NotFound {
                    return Err(e);
                }
            }
        }
    }

    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // A successful rename stays successful even if the dir fsync fails.
        let _ = super::util::fsync_dir(parent);
    }

    Ok(())
}
