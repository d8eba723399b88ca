use assert_fs::TempDir;
use folder_relay::RelayError;
use folder_relay::config::{Config, validate_and_normalize};
use std::fs;

fn roots(td: &TempDir) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let root = dunce::canonicalize(td.path()).unwrap();
    let (w, c, b) = (root.join("watch"), root.join("copy"), root.join("backup"));
    for d in [&w, &c, &b] {
        fs::create_dir_all(d).unwrap();
    }
    (w, c, b)
}

fn field_of(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<RelayError>() {
        Some(RelayError::ConfigInvalid { field, .. }) => *field,
        other => panic!("expected ConfigInvalid, got {other:?}"),
    }
}

#[test]
fn valid_roots_are_canonicalized() {
    let td = TempDir::new().unwrap();
    let (w, c, b) = roots(&td);
    let mut cfg = Config::new(w.join("."), c.join("..").join("copy"), &b);
    validate_and_normalize(&mut cfg).expect("valid roots");
    assert_eq!(cfg.watch_base, w);
    assert_eq!(cfg.copy_base, c);
    assert_eq!(cfg.quarantine_base, b);
}

#[test]
fn missing_directory_names_the_field() {
    let td = TempDir::new().unwrap();
    let (w, c, _) = roots(&td);
    let mut cfg = Config::new(&w, &c, td.path().join("nope"));
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert_eq!(field_of(&err), "backup_path");
    assert!(!td.path().join("nope").exists(), "validation must not create roots");
}

#[test]
fn unset_root_is_rejected() {
    let td = TempDir::new().unwrap();
    let (_, c, b) = roots(&td);
    let mut cfg = Config::new("", &c, &b);
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert_eq!(field_of(&err), "watch_path");
    assert_eq!(err.downcast_ref::<RelayError>().unwrap().code(), 2);
}

#[test]
fn file_instead_of_directory() {
    let td = TempDir::new().unwrap();
    let (w, _, b) = roots(&td);
    let file = td.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();
    let mut cfg = Config::new(&w, &file, &b);
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert_eq!(field_of(&err), "copy_to_path");
}

#[test]
fn copy_and_backup_must_differ() {
    let td = TempDir::new().unwrap();
    let (w, c, _) = roots(&td);
    let mut cfg = Config::new(&w, &c, &c);
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert!(format!("{err}").contains("resolve to the same path"), "{err}");
}

#[test]
fn output_inside_watch_root_is_rejected() {
    let td = TempDir::new().unwrap();
    let (w, _, b) = roots(&td);
    let inner = w.join("copies");
    fs::create_dir_all(&inner).unwrap();
    let mut cfg = Config::new(&w, &inner, &b);
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert_eq!(field_of(&err), "copy_to_path");
    assert!(format!("{err}").contains("must not be inside watch_path"), "{err}");
}

#[test]
fn watch_root_equal_to_copy_root_is_rejected() {
    let td = TempDir::new().unwrap();
    let (w, _, b) = roots(&td);
    let mut cfg = Config::new(&w, &w, &b);
    assert!(validate_and_normalize(&mut cfg).is_err());
}

#[cfg(unix)]
#[test]
fn read_only_copy_root_is_rejected() {
    use std::os::unix::fs::PermissionsExt;
    if unsafe { libc::geteuid() } == 0 {
        return;
    }
    let td = TempDir::new().unwrap();
    let (w, c, b) = roots(&td);
    fs::set_permissions(&c, fs::Permissions::from_mode(0o500)).unwrap();
    let mut cfg = Config::new(&w, &c, &b);
    let res = validate_and_normalize(&mut cfg);
    fs::set_permissions(&c, fs::Permissions::from_mode(0o700)).unwrap();
    let err = res.unwrap_err();
    assert_eq!(field_of(&err), "copy_to_path");
}
