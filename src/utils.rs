use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Return `candidate` if free, otherwise a sibling name with timestamp+pid.
/// - Preserves non-UTF8 names (uses OsString).
/// - Format: "<stem>-<millis>-<pid>[-<n>].<ext?>"
pub(crate) fn unique_destination(candidate: &Path) -> PathBuf {
    if !candidate.exists() {
        return candidate.to_path_buf();
    }

    let epoch_ms = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let pid = std::process::id();
    let stem = candidate
        .file_stem()
        .unwrap_or_else(|| OsStr::new("file"))
        .to_owned();
    let ext = candidate.extension().map(|e| e.to_owned());

    let build = |suffix: String| {
        let mut name = OsString::new();
        name.push(&stem);
        name.push(suffix);
        if let Some(ref e) = ext {
            name.push(".");
            name.push(e);
        }
        candidate.with_file_name(name)
    };

    let first = build(format!("-{epoch_ms}-{pid}"));
    if !first.exists() {
        return first;
    }
    (2u32..=5)
        .map(|n| build(format!("-{epoch_ms}-{pid}-{n}")))
        .find(|p| !p.exists())
        .unwrap_or_else(|| build(format!("-{epoch_ms}-{pid}-final")))
}

/// Quick writable probe: create and remove a small file in `dir`.
/// Uses create_new to avoid clobbering existing files.
pub(crate) fn is_writable_probe(dir: &Path) -> std::io::Result<()> {
    let probe = dir.join(format!(".folder_relay_probe_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unique_destination_same_when_absent() {
        let td = tempdir().unwrap();
        let p = td.path().join("file.txt");
        assert_eq!(unique_destination(&p), p);
    }

    #[test]
    fn unique_destination_keeps_extension() {
        let td = tempdir().unwrap();
        let p = td.path().join("data.bin");
        fs::write(&p, b"x").unwrap();
        let u = unique_destination(&p);
        assert_ne!(u, p);
        assert_eq!(u.extension().and_then(|s| s.to_str()), Some("bin"));
        assert!(u
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with("data-")));
        assert!(!u.exists());
    }

    #[test]
    fn writable_probe_leaves_nothing_behind() {
        let td = tempdir().unwrap();
        is_writable_probe(td.path()).unwrap();
        assert_eq!(fs::read_dir(td.path()).unwrap().count(), 0);
    }
}
