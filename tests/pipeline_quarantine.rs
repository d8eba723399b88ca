// Corrupt the copy between the copy and hashing stages and check that the
// original is preserved in quarantine rather than deleted.

use assert_fs::TempDir;
use assert_fs::prelude::*;
use folder_relay::{
    Roots, StabilityDetector, StabilityStrategy, TransferOutcome, TransferPipeline,
    TransferRequest,
};
use std::fs;
use std::time::Duration;

fn setup() -> (TempDir, TransferPipeline) {
    let td = TempDir::new().unwrap();
    for d in ["watch", "copy", "backup"] {
        td.child(d).create_dir_all().unwrap();
    }
    let root = dunce::canonicalize(td.path()).unwrap();
    let p = TransferPipeline::new(
        Roots::new(root.join("watch"), root.join("copy"), root.join("backup")),
        StabilityDetector::new(StabilityStrategy::Immediate, Duration::from_millis(10)),
        Duration::from_secs(5),
    );
    (td, p)
}

fn flip_first_byte(path: &std::path::Path) {
    let mut bytes = fs::read(path).unwrap();
    bytes[0] ^= 0xff;
    fs::write(path, bytes).unwrap();
}

#[test]
fn corrupted_copy_sends_original_to_quarantine() {
    let (_td, p) = setup();
    let src = p.roots().watch.join("photo.raw");
    let original: Vec<u8> = (0..200_000u32).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(&src, &original).unwrap();

    let req = TransferRequest::for_path(p.roots(), &src).unwrap();
    assert!(p.await_stability(&req.source).unwrap());
    assert!(p.transfer(&req).unwrap());
    flip_first_byte(&req.destination);
    let (source_digest, copy_digest) = p.hash_pair(&req).unwrap();
    assert_ne!(source_digest, copy_digest);

    let out = p.resolve(&req, &source_digest, &copy_digest);
    let TransferOutcome::Quarantined { quarantined_to, .. } = &out else {
        panic!("expected quarantine, got {out}");
    };
    assert_eq!(*quarantined_to, p.roots().quarantine.join("photo.raw"));
    assert!(!src.exists(), "original must leave the watch folder");
    assert_eq!(fs::read(quarantined_to).unwrap(), original, "original bytes must be intact");
    assert!(req.destination.exists(), "suspect copy stays for inspection");
}

#[test]
fn repeated_corruption_never_overwrites_quarantine() {
    let (_td, p) = setup();
    for round in 0..2u8 {
        let src = p.roots().watch.join("same_name.dat");
        fs::write(&src, [round; 128]).unwrap();
        let req = TransferRequest::for_path(p.roots(), &src).unwrap();
        assert!(p.transfer(&req).unwrap());
        flip_first_byte(&req.destination);
        let (a, b) = p.hash_pair(&req).unwrap();
        assert!(p.resolve(&req, &a, &b).is_quarantined());
    }
    let mut kept: Vec<Vec<u8>> = fs::read_dir(&p.roots().quarantine)
        .unwrap()
        .map(|e| fs::read(e.unwrap().path()).unwrap())
        .collect();
    kept.sort();
    assert_eq!(kept, vec![vec![0u8; 128], vec![1u8; 128]]);
}

#[test]
fn nested_original_is_quarantined_under_same_relative_path() {
    let (_td, p) = setup();
    let dir = p.roots().watch.join("cam1");
    fs::create_dir_all(&dir).unwrap();
    let src = dir.join("clip.mp4");
    fs::write(&src, b"frames").unwrap();
    let req = TransferRequest::for_path(p.roots(), &src).unwrap();
    assert!(p.transfer(&req).unwrap());
    flip_first_byte(&req.destination);
    let (a, b) = p.hash_pair(&req).unwrap();
    assert!(p.resolve(&req, &a, &b).is_quarantined());
    assert_eq!(
        fs::read(p.roots().quarantine.join("cam1").join("clip.mp4")).unwrap(),
        b"frames"
    );
}
