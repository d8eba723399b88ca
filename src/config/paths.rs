//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log locations and detects symlinked ancestors for safety.

use anyhow::{anyhow, Result};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

/// Config file location: `$FOLDER_RELAY_CONFIG` if set (a directory means
/// `<dir>/config.xml`), else the platform config dir.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_ENV) {
        let p = PathBuf::from(explicit);
        if p.is_dir() {
            return Ok(p.join("config.xml"));
        }
        return Ok(p);
    }
    if let Some(mut base) = config_dir() {
        base.push("folder_relay");
        base.push("config.xml");
        return Ok(base);
    }
    env::var("HOME")
        .map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("folder_relay")
                .join("config.xml")
        })
        .map_err(|_| anyhow!("no config directory and HOME is unset"))
}

/// Default directory for rotated logs: `logs/` beside the executable, falling
/// back to the user data dir when the executable location is unknown.
pub fn default_log_dir() -> Option<PathBuf> {
    if let Some(dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("logs")))
    {
        return Some(dir);
    }
    data_dir().map(|d| d.join("folder_relay").join("logs"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn env_file_wins() {
        let td = tempdir().unwrap();
        let file = td.path().join("custom.xml");
        unsafe { env::set_var(CONFIG_ENV, &file) };
        let got = default_config_path().unwrap();
        unsafe { env::remove_var(CONFIG_ENV) };
        assert_eq!(got, file);
    }

    #[test]
    #[serial]
    fn env_directory_gets_config_xml() {
        let td = tempdir().unwrap();
        unsafe { env::set_var(CONFIG_ENV, td.path()) };
        let got = default_config_path().unwrap();
        unsafe { env::remove_var(CONFIG_ENV) };
        assert_eq!(got, td.path().join("config.xml"));
    }

    #[test]
    fn log_dir_is_named_logs() {
        let dir = default_log_dir().expect("some log dir");
        assert_eq!(dir.file_name().and_then(|s| s.to_str()), Some("logs"));
    }

    #[cfg(unix)]
    #[test]
    fn detects_symlinked_parent() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("x.log")).unwrap());
        assert!(!path_has_symlink_ancestor(&real.join("x.log")).unwrap());
    }
}
