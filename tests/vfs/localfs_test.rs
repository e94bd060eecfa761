/*!
 * LocalFS Tests
 * Store contract checks against a real directory tree
 */

use std::io::{Read, Write};

use scopefs::vfs::{FileSystem, FileType, LocalFS, Permissions, VfsError};
use tempfile::TempDir;

#[test]
fn test_create_read_stat() {
    let temp = TempDir::new().unwrap();
    let fs = LocalFS::new();
    let path = temp.path().join("notes.txt");

    let mut file = fs.create(&path, Permissions::readwrite()).unwrap();
    file.write_all(b"line one\n").unwrap();
    file.sync().unwrap();
    drop(file);

    let mut data = String::new();
    fs.open(&path).unwrap().read_to_string(&mut data).unwrap();
    assert_eq!(data, "line one\n");

    let md = fs.stat(&path).unwrap();
    assert!(md.is_file());
    assert_eq!(md.size, 9);
}

#[test]
fn test_rename_and_remove() {
    let temp = TempDir::new().unwrap();
    let fs = LocalFS::new();
    let dir = temp.path().join("d");
    fs.mkdir_all(&dir, Permissions::directory()).unwrap();
    fs.create(&dir.join("a"), Permissions::readwrite()).unwrap();

    fs.rename(&dir.join("a"), &dir.join("b")).unwrap();
    assert!(!fs.exists(&dir.join("a")));
    assert!(fs.exists(&dir.join("b")));

    assert!(fs.remove(&dir).is_err());
    fs.remove(&dir.join("b")).unwrap();
    fs.remove(&dir).unwrap();
    assert!(!fs.exists(&dir));
}

#[test]
fn test_missing_entries() {
    let temp = TempDir::new().unwrap();
    let fs = LocalFS::new();
    let missing = temp.path().join("missing");
    assert!(matches!(fs.open(&missing), Err(VfsError::NotFound(_))));
    assert!(matches!(fs.read_dir(&missing), Err(VfsError::NotFound(_))));
}

#[cfg(unix)]
#[test]
fn test_dangling_link_is_visible_to_lstat() {
    let temp = TempDir::new().unwrap();
    let fs = LocalFS::new();
    let link = temp.path().join("dangling");
    fs.symlink_if_supported(&temp.path().join("nowhere"), &link)
        .unwrap()
        .unwrap();

    assert!(fs.stat(&link).is_err());
    assert!(fs.lstat_if_supported(&link).unwrap().unwrap().is_symlink());
    assert!(fs.exists(&link));

    let entries = fs.read_dir(temp.path()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_type, FileType::Symlink);
}

#[cfg(unix)]
#[test]
fn test_fifo_reported_as_special() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pipe");
    let status = std::process::Command::new("mkfifo").arg(&path).status();
    if !matches!(status, Ok(s) if s.success()) {
        return;
    }

    let md = LocalFS::new().stat(&path).unwrap();
    assert_eq!(md.file_type, FileType::Fifo);
    assert!(md.is_special());
}
