//! I/O helper utilities.
//!
//! Turns an io::Error into a short operator-facing hint so failure logs say
//! what to check, not only what failed.
//!
//! Usage:
//!   warn!(error = %e, hint = io_hint(&e).unwrap_or(""), "copy failed");

use std::io;

/// Platform-aware hint for a failed filesystem call, if one applies.
pub fn io_hint(e: &io::Error) -> Option<&'static str> {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            let hint = match code {
                libc::EACCES | libc::EPERM => Some("permission denied; check ownership and write permissions"),
                libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
                libc::EBUSY | libc::ETXTBSY => Some("resource busy; another process still holds the file"),
                libc::ENOENT => Some("path not found; it may have been moved or deleted"),
                libc::EEXIST => Some("already exists"),
                libc::EISDIR => Some("target is a directory"),
                libc::ENOSPC => Some("insufficient space on device"),
                libc::EROFS => Some("read-only filesystem; cannot write here"),
                libc::ENAMETOOLONG => Some("filename or path too long"),
                libc::EMFILE | libc::ENFILE => Some("too many open files"),
                _ => None,
            };
            if hint.is_some() {
                return hint;
            }
        }
        #[cfg(windows)]
        {
            let hint = match code {
                5 => Some("access denied; check permissions"),
                17 => Some("not same device; cross-filesystem move"),
                32 | 33 => Some("sharing violation; file is in use"),
                2 | 3 => Some("path not found; it may have been moved or deleted"),
                80 | 183 => Some("already exists"),
                112 => Some("insufficient disk space"),
                206 => Some("filename or path too long"),
                _ => None,
            };
            if hint.is_some() {
                return hint;
            }
        }
    }
    match e.kind() {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found; it may have been moved or deleted"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            Some("busy/timed out; retry after the current write finishes")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_fallback_without_os_code() {
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "x");
        assert!(io_hint(&e).unwrap().starts_with("permission denied"));
        let e = io::Error::other("x");
        assert!(io_hint(&e).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn os_code_hint() {
        let e = io::Error::from_raw_os_error(libc::EXDEV);
        assert!(io_hint(&e).unwrap().contains("cross-filesystem"));
    }
}
