// Tests that touch FOLDER_RELAY_CONFIG run serially.

use assert_fs::TempDir;
use folder_relay::config::{CONFIG_ENV, create_template_config, default_config_path, load_or_default};
use folder_relay::{LogLevel, StabilityStrategy};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

struct EnvGuard(Option<std::ffi::OsString>);

impl EnvGuard {
    fn set(value: &std::path::Path) -> Self {
        let prev = env::var_os(CONFIG_ENV);
        unsafe { env::set_var(CONFIG_ENV, value) };
        EnvGuard(prev)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.0.take() {
            Some(v) => unsafe { env::set_var(CONFIG_ENV, v) },
            None => unsafe { env::remove_var(CONFIG_ENV) },
        }
    }
}

#[test]
#[serial]
fn env_file_is_loaded() {
    let td = TempDir::new().unwrap();
    let file = td.path().join("relay.xml");
    fs::write(
        &file,
        "<config>\n  <watch_path>/srv/in</watch_path>\n  <copy_to_path>/srv/out</copy_to_path>\n  <backup_path>/srv/bad</backup_path>\n  <log_level>debug</log_level>\n  <strategy>rename</strategy>\n  <poll_interval_ms>250</poll_interval_ms>\n</config>\n",
    )
    .unwrap();
    let _g = EnvGuard::set(&file);

    let (cfg, used) = load_or_default().unwrap();
    assert_eq!(used.as_deref(), Some(file.as_path()));
    assert_eq!(cfg.watch_base, PathBuf::from("/srv/in"));
    assert_eq!(cfg.copy_base, PathBuf::from("/srv/out"));
    assert_eq!(cfg.quarantine_base, PathBuf::from("/srv/bad"));
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.stability, StabilityStrategy::RenameProbe);
    assert_eq!(cfg.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.stability_timeout, Duration::from_secs(600));
}

#[test]
#[serial]
fn env_directory_means_config_xml_inside() {
    let td = TempDir::new().unwrap();
    let _g = EnvGuard::set(td.path());
    assert_eq!(default_config_path().unwrap(), td.path().join("config.xml"));
}

#[test]
#[serial]
fn missing_file_yields_defaults() {
    let td = TempDir::new().unwrap();
    let _g = EnvGuard::set(&td.path().join("absent.xml"));
    let (cfg, used) = load_or_default().unwrap();
    assert!(used.is_none());
    assert!(cfg.watch_base.as_os_str().is_empty());
    assert_eq!(cfg.log_level, LogLevel::Normal);
}

#[test]
#[serial]
fn malformed_file_is_an_error() {
    let td = TempDir::new().unwrap();
    let file = td.path().join("bad.xml");
    fs::write(&file, "<config><watch_path>/x</config>").unwrap();
    let _g = EnvGuard::set(&file);
    assert!(load_or_default().is_err());
}

#[test]
#[serial]
fn invalid_log_level_is_an_error() {
    let td = TempDir::new().unwrap();
    let file = td.path().join("lvl.xml");
    fs::write(&file, "<config><log_level>shouty</log_level></config>").unwrap();
    let _g = EnvGuard::set(&file);
    let err = load_or_default().unwrap_err();
    assert!(format!("{err}").contains("invalid log level"), "{err}");
}

#[cfg(unix)]
#[test]
fn template_is_private() {
    use std::os::unix::fs::PermissionsExt;
    let td = TempDir::new().unwrap();
    let path = td.path().join("cfg").join("config.xml");
    create_template_config(&path).unwrap();
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[cfg(unix)]
#[test]
fn template_refuses_symlinked_ancestor() {
    let td = TempDir::new().unwrap();
    let real = td.path().join("real");
    fs::create_dir_all(&real).unwrap();
    let link = td.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();
    assert!(create_template_config(&link.join("config.xml")).is_err());
    assert!(!real.join("config.xml").exists());
}
