/*!
 * File Operation Tests
 * Copy, move, delete and usage against real and in-memory stores
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use scopefs::errors::{ErrorKind, FsError, FsResult};
use scopefs::fileops::{Deadline, Usage};
use scopefs::files::Algorithm;
use scopefs::permissions::{AccessPolicy, Rule, RuleSet};
use scopefs::sandbox::{InfoOptions, Sandbox, VirtualPath};
use scopefs::vfs::{FileSystem, FileType, LocalFS, MemFS, Permissions};
use tempfile::TempDir;

fn local_sandbox() -> (TempDir, Sandbox) {
    let temp = TempDir::new().unwrap();
    let sandbox = Sandbox::new(temp.path(), Arc::new(LocalFS::new()));
    (temp, sandbox)
}

/// Virtual path of every regular file under `dir` mapped to its sha256
fn digests(sandbox: &Sandbox, host: &Path, dir: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let mut pending = vec![(host.to_path_buf(), String::new())];
    while let Some((path, rel)) = pending.pop() {
        for entry in fs::read_dir(&path).unwrap() {
            let entry = entry.unwrap();
            let name = entry.file_name().into_string().unwrap();
            let rel = format!("{}/{}", rel, name);
            if entry.file_type().unwrap().is_dir() {
                pending.push((entry.path(), rel));
            } else {
                let digest = sandbox
                    .checksum(&format!("{}{}", dir, rel), "sha256")
                    .unwrap();
                out.insert(rel, digest);
            }
        }
    }
    out
}

#[test]
fn test_round_trip_copy() {
    let (temp, sandbox) = local_sandbox();
    let src = temp.path().join("project");
    fs::create_dir_all(src.join("src/nested")).unwrap();
    fs::create_dir_all(src.join("empty")).unwrap();
    fs::write(src.join("README"), b"readme").unwrap();
    fs::write(src.join("src/main.rs"), b"fn main() {}").unwrap();
    fs::write(src.join("src/nested/data.bin"), [0u8, 159, 146, 150]).unwrap();

    sandbox.copy("/project", "/archive/project").unwrap();

    let dst = temp.path().join("archive/project");
    assert_eq!(
        digests(&sandbox, &src, "/project"),
        digests(&sandbox, &dst, "/archive/project")
    );
    assert!(dst.join("empty").is_dir());
    assert_eq!(digests(&sandbox, &src, "/project").len(), 3);
}

#[cfg(unix)]
#[test]
fn test_copy_preserves_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let (temp, sandbox) = local_sandbox();
    let script = temp.path().join("run.sh");
    fs::write(&script, b"#!/bin/sh\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o750)).unwrap();

    sandbox.copy("/run.sh", "/bin/run.sh").unwrap();
    let mode = fs::metadata(temp.path().join("bin/run.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o750);
}

#[cfg(unix)]
#[test]
fn test_symlink_targets_rewritten_into_sandbox() {
    let (temp, sandbox) = local_sandbox();
    let root = temp.path();
    fs::create_dir(root.join("links")).unwrap();
    fs::write(root.join("data.txt"), b"x").unwrap();
    std::os::unix::fs::symlink("../data.txt", root.join("links/rel")).unwrap();
    std::os::unix::fs::symlink(root.join("data.txt"), root.join("links/inside")).unwrap();
    std::os::unix::fs::symlink("/etc/passwd", root.join("links/outside")).unwrap();

    sandbox.copy("/links", "/copied").unwrap();

    let read = |name: &str| fs::read_link(root.join("copied").join(name)).unwrap();
    assert_eq!(read("rel"), Path::new("../data.txt"));
    assert_eq!(read("inside"), root.join("data.txt"));
    assert_eq!(read("outside"), root.join("etc/passwd"));
}

#[cfg(unix)]
#[test]
fn test_copied_links_never_climb_out_of_sandbox() {
    let (temp, sandbox) = local_sandbox();
    let root = temp.path();
    fs::create_dir(root.join("links")).unwrap();
    let climbing = root.join("../../../../etc/passwd");
    std::os::unix::fs::symlink(&climbing, root.join("links/dotted")).unwrap();
    std::os::unix::fs::symlink("../../../../../../etc/passwd", root.join("links/relative"))
        .unwrap();
    std::os::unix::fs::symlink(root.join("links/../a/../b"), root.join("links/inner"))
        .unwrap();

    sandbox.copy("/links", "/copied").unwrap();

    let landing = |name: &str| {
        let link_dir = root.join("copied");
        let target = fs::read_link(link_dir.join(name)).unwrap();
        path_clean::clean(link_dir.join(target))
    };
    for name in ["dotted", "relative", "inner"] {
        let target = landing(name);
        assert!(target.starts_with(root), "{} -> {}", name, target.display());
    }
    assert_eq!(landing("dotted"), root.join("etc/passwd"));
    assert_eq!(landing("relative"), root.join("etc/passwd"));
    assert_eq!(landing("inner"), root.join("b"));
}

#[test]
fn test_root_protection_ignores_rules() {
    let fs = MemFS::new();
    fs.mkdir_all(Path::new("/jail/a"), Permissions::directory())
        .unwrap();
    let sandbox = Sandbox::new("/jail", Arc::new(fs.clone())).with_policy(AccessPolicy::new(
        RuleSet::new(vec![Rule::allow_prefix("/")]),
        RuleSet::new(vec![Rule::allow_prefix("/")]),
    ));

    for result in [
        sandbox.remove("/"),
        sandbox.remove("/a/.."),
        sandbox.rename("/", "/b"),
        sandbox.rename("/a", "/"),
        sandbox.mkdir("/"),
        sandbox.copy("/", "/b"),
        sandbox.copy("/a", "/a"),
    ] {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidOperation);
    }
    assert!(fs.exists(Path::new("/jail/a")));
}

#[test]
fn test_partial_failure_reports_every_child() {
    let fs = MemFS::new();
    fs.mkdir_all(Path::new("/jail/src/deep"), Permissions::directory())
        .unwrap();
    fs.create(Path::new("/jail/src/ok"), Permissions::readwrite())
        .unwrap();
    fs.mknod(Path::new("/jail/src/fifo"), FileType::Fifo).unwrap();
    fs.mknod(Path::new("/jail/src/deep/sock"), FileType::Socket)
        .unwrap();
    let sandbox = Sandbox::new("/jail", Arc::new(fs.clone()));

    let err = sandbox.copy("/src", "/dst").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Partial);
    let FsError::Partial(aggregate) = &err else {
        unreachable!()
    };
    let mut failed: Vec<&str> = aggregate.iter().map(|f| f.path.as_str()).collect();
    failed.sort();
    assert_eq!(failed, vec!["/src/deep/sock", "/src/fifo"]);

    // One line per failure, no host paths
    let report = err.to_string();
    assert!(!report.contains("/jail"));
    assert!(fs.exists(Path::new("/jail/dst/ok")));
}

#[test]
fn test_deadline_interrupts_walks() {
    let fs = MemFS::new();
    fs.mkdir_all(Path::new("/jail/tree/a/b"), Permissions::directory())
        .unwrap();
    let sandbox = Sandbox::new("/jail", Arc::new(fs.clone()));

    let expired = Deadline::after(Duration::ZERO);
    assert_eq!(
        sandbox.remove_with("/tree", &expired).unwrap_err().kind(),
        ErrorKind::Interrupted
    );
    assert!(fs.exists(Path::new("/jail/tree/a/b")));

    let generous = Deadline::after(Duration::from_secs(3600));
    assert_eq!(
        sandbox.disk_usage_with("/tree", 10, &generous).unwrap(),
        Usage { size: 0, inodes: 3 }
    );

    let stop_at_b = |p: &VirtualPath| -> FsResult<()> {
        if p.name() == "b" {
            Err(FsError::Interrupted("enough".to_string()))
        } else {
            Ok(())
        }
    };
    let err = sandbox.copy_with("/tree", "/copy", &stop_at_b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Interrupted);
    // Work done before the stop stays
    assert!(fs.exists(Path::new("/jail/copy/a")));
    assert!(!fs.exists(Path::new("/jail/copy/a/b")));
}

#[test]
fn test_disk_usage_depth() {
    let (temp, sandbox) = local_sandbox();
    fs::create_dir(temp.path().join("d")).unwrap();
    fs::write(temp.path().join("d/one"), b"1").unwrap();
    fs::write(temp.path().join("d/two"), b"22").unwrap();

    let usage = sandbox.disk_usage("/d", 0).unwrap();
    assert_eq!(usage.inodes, 1);
    let usage = sandbox.disk_usage("/d", 1).unwrap();
    assert_eq!(usage.inodes, 3);
}

#[test]
fn test_info_checksums_every_algorithm() {
    let (temp, sandbox) = local_sandbox();
    fs::write(temp.path().join("hello"), b"hello").unwrap();

    let opts = InfoOptions {
        checksums: Algorithm::ALL.to_vec(),
        ..InfoOptions::default()
    };
    let entry = sandbox.info("/hello", &opts).unwrap();
    assert_eq!(entry.checksums.len(), 4);
    assert_eq!(
        entry.checksums["sha256"],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}
