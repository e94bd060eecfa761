/*!
 * MemFS Tests
 * Store contract checks for the in-memory backend
 */

use std::io::{Read, Write};
use std::path::Path;

use pretty_assertions::assert_eq;
use scopefs::vfs::{FileSystem, FileType, MemFS, Permissions, VfsError};

fn write(fs: &MemFS, path: &str, data: &[u8]) {
    let mut file = fs.create(Path::new(path), Permissions::readwrite()).unwrap();
    file.write_all(data).unwrap();
    file.sync().unwrap();
}

fn read(fs: &MemFS, path: &str) -> Vec<u8> {
    let mut data = Vec::new();
    fs.open(Path::new(path))
        .unwrap()
        .read_to_end(&mut data)
        .unwrap();
    data
}

#[test]
fn test_memfs_basic() {
    let fs = MemFS::new();

    write(&fs, "/test.txt", b"hello");
    assert_eq!(read(&fs, "/test.txt"), b"hello");

    assert!(fs.exists(Path::new("/test.txt")));
    assert!(!fs.exists(Path::new("/missing.txt")));

    fs.remove(Path::new("/test.txt")).unwrap();
    assert!(!fs.exists(Path::new("/test.txt")));
}

#[test]
fn test_memfs_directories() {
    let fs = MemFS::new();

    fs.mkdir_all(Path::new("/testdir/nested"), Permissions::directory())
        .unwrap();
    assert!(fs.stat(Path::new("/testdir")).unwrap().is_dir());
    assert!(fs.stat(Path::new("/testdir/nested")).unwrap().is_dir());

    write(&fs, "/testdir/file.txt", b"content");
    let mut names: Vec<String> = fs
        .read_dir(Path::new("/testdir"))
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["file.txt".to_string(), "nested".to_string()]);

    fs.remove_all(Path::new("/testdir")).unwrap();
    assert!(!fs.exists(Path::new("/testdir/nested")));
    assert_eq!(fs.used_bytes(), 0);
}

#[test]
fn test_capacity_limit() {
    let fs = MemFS::with_capacity(10);

    write(&fs, "/small.txt", b"hello");

    let mut file = fs
        .create(Path::new("/large.txt"), Permissions::readwrite())
        .unwrap();
    file.write_all(b"hello world").unwrap();
    assert!(matches!(file.sync(), Err(VfsError::OutOfSpace)));
}

#[test]
fn test_path_normalization() {
    let fs = MemFS::new();
    write(&fs, "/test.txt", b"hello");

    assert!(fs.exists(Path::new("test.txt")));
    assert!(fs.exists(Path::new("/test.txt")));
    assert!(fs.exists(Path::new("//test.txt")));
    assert!(fs.exists(Path::new("/a/../test.txt")));
}

#[test]
fn test_create_truncates() {
    let fs = MemFS::new();
    write(&fs, "/f", b"long contents");
    write(&fs, "/f", b"short");
    assert_eq!(read(&fs, "/f"), b"short");
    assert_eq!(fs.stat(Path::new("/f")).unwrap().size, 5);
}

#[test]
fn test_missing_parent() {
    let fs = MemFS::new();
    assert!(matches!(
        fs.create(Path::new("/no/such/file"), Permissions::readwrite()),
        Err(VfsError::NotFound(_))
    ));
}

#[test]
fn test_special_nodes() {
    let fs = MemFS::new();
    fs.mknod(Path::new("/fifo"), FileType::Fifo).unwrap();

    let md = fs.stat(Path::new("/fifo")).unwrap();
    assert!(md.is_special());
    assert!(fs.open(Path::new("/fifo")).is_err());
    assert!(fs.mknod(Path::new("/plain"), FileType::File).is_err());
}

#[test]
fn test_symlink_capability_absent() {
    let fs = MemFS::new();
    write(&fs, "/t", b"x");
    assert!(fs.lstat_if_supported(Path::new("/t")).is_none());
    assert!(fs.readlink_if_supported(Path::new("/t")).is_none());
    assert!(fs
        .symlink_if_supported(Path::new("/t"), Path::new("/l"))
        .is_none());
}

#[test]
fn test_concurrent_writers() {
    let fs = MemFS::new();
    fs.mkdir_all(Path::new("/shared"), Permissions::directory())
        .unwrap();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let fs = fs.clone();
            scope.spawn(move || {
                let path = format!("/shared/file{}", i);
                let mut file = fs.create(Path::new(&path), Permissions::readwrite()).unwrap();
                file.write_all(&[b'x'; 4]).unwrap();
            });
        }
    });

    assert_eq!(fs.read_dir(Path::new("/shared")).unwrap().len(), 8);
    assert_eq!(fs.used_bytes(), 32);
}
