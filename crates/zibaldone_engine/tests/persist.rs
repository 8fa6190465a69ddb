use std::fs;

use tempfile::TempDir;
use zibaldone_engine::{ensure_state_dir, AtomicFileWriter, PersistError};

#[test]
fn missing_state_dir_is_created_with_parents() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("config").join("zibaldone");
    ensure_state_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn a_file_in_place_of_the_state_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("state");
    fs::write(&blocker, "x").unwrap();

    match ensure_state_dir(&blocker) {
        Err(PersistError::StateDir { path, reason }) => {
            assert_eq!(path, blocker);
            assert_eq!(reason, "not a directory");
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn preferences_file_is_replaced_whole() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("state"));

    let first = writer.write("preferences.ron", b"(theme: Dark)").unwrap();
    assert_eq!(first.file_name().unwrap(), "preferences.ron");
    let second = writer.write("preferences.ron", b"(theme: Ocean)").unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "(theme: Ocean)");
    let entries = fs::read_dir(temp.path().join("state")).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn unusable_dir_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = AtomicFileWriter::new(&file_path).write("preferences.ron", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("preferences.ron").exists());
}
