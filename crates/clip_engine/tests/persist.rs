use std::fs;
use std::io::Write;

use clip_engine::{ensure_output_dir, numbered_name, persist_unique, PersistError};
use tempfile::{NamedTempFile, TempDir};

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("clips").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    assert!(matches!(
        ensure_output_dir(&file_path),
        Err(PersistError::OutputDir(_))
    ));
}

#[test]
fn numbered_names_keep_the_extension() {
    assert_eq!(numbered_name("clip.mp4", 0), "clip.mp4");
    assert_eq!(numbered_name("clip.mp4", 2), "clip (2).mp4");
    assert_eq!(numbered_name("archive.tar.gz", 1), "archive.tar (1).gz");
    assert_eq!(numbered_name("README", 3), "README (3)");
    assert_eq!(numbered_name(".hidden", 1), ".hidden (1)");
}

fn temp_with(dir: &TempDir, body: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new_in(dir.path()).unwrap();
    tmp.write_all(body.as_bytes()).unwrap();
    tmp
}

#[test]
fn collisions_get_numbered_and_nothing_is_replaced() {
    let temp = TempDir::new().unwrap();

    let first = persist_unique(temp_with(&temp, "one"), temp.path(), "clip.mp4").unwrap();
    let second = persist_unique(temp_with(&temp, "two"), temp.path(), "clip.mp4").unwrap();
    let third = persist_unique(temp_with(&temp, "three"), temp.path(), "clip.mp4").unwrap();

    assert_eq!(first.file_name().unwrap(), "clip.mp4");
    assert_eq!(second.file_name().unwrap(), "clip (1).mp4");
    assert_eq!(third.file_name().unwrap(), "clip (2).mp4");
    assert_eq!(fs::read_to_string(&first).unwrap(), "one");
    assert_eq!(fs::read_to_string(&second).unwrap(), "two");
    assert_eq!(fs::read_to_string(&third).unwrap(), "three");
}
