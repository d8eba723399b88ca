//! Windows implementations of platform helpers (best-effort, no ACL management).

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_LOCK_VIOLATION, ERROR_SHARING_VIOLATION,
};

use super::temp::tmp_sibling_name;

/// Temp file + fsync + rename. Rename replaces an existing target on Windows
/// only when it is removed first.
fn atomic_write(path: &Path, contents: &[u8], tag: &str) -> Result<()> {
    let tmp = tmp_sibling_name(path, tag);
    let mut f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .with_context(|| format!("create temp '{}'", tmp.display()))?;
    f.write_all(contents)?;
    f.sync_all()?;
    drop(f);
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e)
            .with_context(|| format!("rename '{}' -> '{}'", tmp.display(), path.display()));
    }
    Ok(())
}

/// Write a new config file atomically.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    atomic_write(path, contents, "config")
}

/// Write our process id to `path`.
pub fn write_pid_file(path: &Path) -> Result<()> {
    let body = format!("{}", std::process::id());
    atomic_write(path, body.as_bytes(), "pid")
}

/// No-op on Windows; POSIX-style directory modes are not applicable.
pub fn set_dir_mode_0700(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// True when a rename failed because another handle has the file open.
pub fn is_lock_contention(e: &io::Error) -> bool {
    match e.raw_os_error() {
        Some(code) => {
            let code = code as u32;
            code == ERROR_SHARING_VIOLATION
                || code == ERROR_LOCK_VIOLATION
                || code == ERROR_ACCESS_DENIED
        }
        None => e.kind() == io::ErrorKind::PermissionDenied,
    }
}
