//! Unix implementations of platform helpers.

use super::common_unix::atomic_write_mode;
use anyhow::Result;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Write config atomically: temp file (0600) + fsync + rename + fsync dir.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    atomic_write_mode(path, contents, 0o600, "config")
}

/// Write our process id to `path` (0644 so supervisors running as other users can read it).
pub fn write_pid_file(path: &Path) -> Result<()> {
    let body = format!("{}", std::process::id());
    atomic_write_mode(path, body.as_bytes(), 0o644, "pid")
}

/// POSIX chmod 0700 for directories.
pub fn set_dir_mode_0700(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
}

/// True when a rename failed because something else holds the file.
pub fn is_lock_contention(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        Some(libc::EBUSY) | Some(libc::ETXTBSY) | Some(libc::EACCES) | Some(libc::EPERM)
    )
}
