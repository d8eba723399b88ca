// Exercises the OS watcher. Delivery latency varies by platform, so every
// wait is bounded generously.

use assert_fs::TempDir;
use folder_relay::{EventSource, NotifySource, SourcePoll, WatchEvent};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

fn wait_for<F>(src: &mut NotifySource, mut pred: F) -> Option<WatchEvent>
where
    F: FnMut(&WatchEvent) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        match src.next_event(Duration::from_millis(100)).unwrap() {
            SourcePoll::Event(ev) if pred(&ev) => return Some(ev),
            SourcePoll::Closed => return None,
            _ => {}
        }
    }
    None
}

fn same_file(a: &Path, b: &Path) -> bool {
    a.file_name() == b.file_name()
}

#[test]
fn reports_created_file() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let mut src = NotifySource::watch(&root).unwrap();

    let file = root.join("arrived.txt");
    fs::write(&file, b"hi").unwrap();

    let ev = wait_for(&mut src, |ev| matches!(ev, WatchEvent::Created { .. }))
        .expect("no created event within 10s");
    assert!(same_file(ev.path(), &file), "{ev:?}");
}

#[test]
fn reports_nested_created_file() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let sub = root.join("sub");
    fs::create_dir(&sub).unwrap();
    let mut src = NotifySource::watch(&root).unwrap();

    let file = sub.join("deep.bin");
    fs::write(&file, b"x").unwrap();

    let ev = wait_for(&mut src, |ev| {
        matches!(ev, WatchEvent::Created { path } if same_file(path, &file))
    });
    assert!(ev.is_some(), "nested create not reported");
}

#[test]
fn move_in_from_outside_counts_as_arrival() {
    let td = TempDir::new().unwrap();
    let base = dunce::canonicalize(td.path()).unwrap();
    let root = base.join("watched");
    let staging = base.join("staging");
    fs::create_dir(&root).unwrap();
    fs::create_dir(&staging).unwrap();
    let staged = staging.join("upload.iso");
    fs::write(&staged, b"image").unwrap();
    let mut src = NotifySource::watch(&root).unwrap();

    let target = root.join("upload.iso");
    fs::rename(&staged, &target).unwrap();

    let ev = wait_for(&mut src, |ev| {
        matches!(ev, WatchEvent::Created { path } if same_file(path, &target))
    });
    assert!(ev.is_some(), "moved-in file not reported as created");
}

#[cfg(target_os = "linux")]
#[test]
fn rename_inside_tree_is_a_move() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let a = root.join("a.txt");
    fs::write(&a, b"x").unwrap();
    let mut src = NotifySource::watch(&root).unwrap();

    let b = root.join("b.txt");
    fs::rename(&a, &b).unwrap();

    let ev = wait_for(&mut src, |ev| matches!(ev, WatchEvent::Moved { .. }))
        .expect("no move event within 10s");
    assert_eq!(ev, WatchEvent::Moved { from: a, to: b });
}

#[cfg(target_os = "linux")]
#[test]
fn move_out_of_tree_counts_as_deleted() {
    let td = TempDir::new().unwrap();
    let base = dunce::canonicalize(td.path()).unwrap();
    let root = base.join("watched");
    let elsewhere = base.join("elsewhere");
    fs::create_dir(&root).unwrap();
    fs::create_dir(&elsewhere).unwrap();
    let leaving = root.join("leaving.txt");
    fs::write(&leaving, b"bye").unwrap();
    let mut src = NotifySource::watch(&root).unwrap();

    fs::rename(&leaving, elsewhere.join("leaving.txt")).unwrap();

    let ev = wait_for(&mut src, |ev| {
        matches!(ev, WatchEvent::Deleted { path } if same_file(path, &leaving))
    });
    assert!(ev.is_some(), "moved-out file not reported as deleted");
}
