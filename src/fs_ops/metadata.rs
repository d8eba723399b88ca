//! Metadata preservation.
//! - Copies timestamps (atime, mtime) and permission bits from source to dest.
//! - Extended attributes follow when the `xattrs` feature is enabled.
//! - Creation time cannot be set portably; the copy gets its own birth time.
//! - Best-effort: individual failures are logged and skipped, the byte copy
//!   already succeeded and the hash check decides the file's fate.

use filetime::{set_file_times, FileTime};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Apply `src_meta` (fetched before the copy) to `dest`.
pub(super) fn preserve_metadata(src: &Path, dest: &Path, src_meta: &fs::Metadata) {
    let (at, mt) = {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            (
                Some(FileTime::from_unix_time(src_meta.atime(), src_meta.atime_nsec() as u32)),
                Some(FileTime::from_unix_time(src_meta.mtime(), src_meta.mtime_nsec() as u32)),
            )
        }
        #[cfg(not(unix))]
        {
            (
                src_meta.accessed().ok().map(FileTime::from_system_time),
                src_meta.modified().ok().map(FileTime::from_system_time),
            )
        }
    };
    if let Some(mt) = mt {
        let at = at.unwrap_or(mt);
        match set_file_times(dest, at, mt) {
            Ok(()) => trace!(path = %dest.display(), "set atime/mtime on destination"),
            Err(e) => warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination"),
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = src_meta.permissions().mode() & 0o7777;
        match fs::set_permissions(dest, fs::Permissions::from_mode(mode)) {
            Ok(()) => trace!(path = %dest.display(), mode = format!("{mode:o}"), "set permissions on destination"),
            Err(e) => warn!(path = %dest.display(), mode = format!("{mode:o}"), error = %e, "failed to set permissions on destination"),
        }
    }
    #[cfg(windows)]
    {
        let ro = src_meta.permissions().readonly();
        if let Ok(meta) = fs::metadata(dest) {
            let mut perms = meta.permissions();
            perms.set_readonly(ro);
            if let Err(e) = fs::set_permissions(dest, perms) {
                warn!(path = %dest.display(), readonly = ro, error = %e, "failed to set readonly attribute on destination");
            }
        }
    }

    preserve_xattrs(src, dest);
}

#[cfg(feature = "xattrs")]
fn preserve_xattrs(src: &Path, dest: &Path) {
    let names = match xattr::list(src) {
        Ok(n) => n,
        Err(e) => {
            warn!(src = %src.display(), error = %e, "failed to list xattrs; continuing");
            return;
        }
    };
    for name in names {
        let value = match xattr::get(src, &name) {
            Ok(v) => v.unwrap_or_default(),
            Err(e) => {
                warn!(src = %src.display(), xattr = %name.to_string_lossy(), error = %e, "failed to read xattr");
                continue;
            }
        };
        if let Err(e) = xattr::set(dest, &name, &value) {
            warn!(dest = %dest.display(), xattr = %name.to_string_lossy(), error = %e, "failed to set xattr");
        }
    }
}

#[cfg(not(feature = "xattrs"))]
fn preserve_xattrs(_src: &Path, _dest: &Path) {}
