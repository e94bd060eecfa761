/*!
 * Listing Tests
 * Directory listings through the sandbox facade
 */

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use scopefs::errors::FsError;
use scopefs::listing::{ListingRequest, MemoryPreferences, PreferenceStore, SortKey, SortOrder};
use scopefs::permissions::{AccessPolicy, Rule, RuleSet};
use scopefs::sandbox::Sandbox;
use scopefs::vfs::{FileSystem, MemFS, Permissions};

fn put(fs: &MemFS, path: &str, size: usize) {
    let mut file = fs.create(Path::new(path), Permissions::readwrite()).unwrap();
    file.write_all(&vec![b'a'; size]).unwrap();
}

/// Five files and two directories under /home/u/mixed
fn mixed() -> Sandbox {
    let fs = MemFS::new();
    fs.mkdir_all(Path::new("/home/u/mixed/zeta"), Permissions::directory())
        .unwrap();
    fs.mkdir_all(Path::new("/home/u/mixed/Alpha"), Permissions::directory())
        .unwrap();
    for (name, size) in [("e.txt", 5), ("b.txt", 2), ("D.txt", 4), ("a.txt", 1), ("c.txt", 3)] {
        put(&fs, &format!("/home/u/mixed/{}", name), size);
    }
    Sandbox::new("/home/u", Arc::new(fs))
}

fn names(items: &[scopefs::files::FileEntry]) -> Vec<&str> {
    items.iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn test_listing_with_limit() {
    let sandbox = mixed();
    let request = ListingRequest {
        sort: Some("name".to_string()),
        order: Some("asc".to_string()),
        limit: Some(3),
    };
    let listing = sandbox
        .list("/mixed", &request, &mut MemoryPreferences::new())
        .unwrap();

    assert_eq!(listing.num_dirs, 2);
    assert_eq!(listing.num_files, 5);
    assert_eq!(listing.items.len(), 3);
    assert_eq!(names(&listing.items), vec!["Alpha", "zeta", "a.txt"]);
    assert_eq!(listing.items_limited_to, Some(3));
}

#[test]
fn test_denied_subtree_is_invisible() {
    let fs = MemFS::new();
    fs.mkdir_all(Path::new("/home/u/.secret"), Permissions::directory())
        .unwrap();
    put(&fs, "/home/u/public.txt", 6);
    put(&fs, "/home/u/.secret/key", 6);

    let sandbox = Sandbox::new("/home/u", Arc::new(fs)).with_policy(AccessPolicy::new(
        RuleSet::new(vec![Rule::deny_prefix("/.secret")]),
        RuleSet::default(),
    ));
    let listing = sandbox
        .list("/", &ListingRequest::default(), &mut MemoryPreferences::new())
        .unwrap();

    assert_eq!(names(&listing.items), vec!["public.txt"]);
    assert_eq!(listing.num_dirs, 0);
    assert_eq!(listing.num_files, 1);
    assert_eq!(listing.name, "/");

    assert_eq!(
        sandbox
            .list("/.secret", &ListingRequest::default(), &mut MemoryPreferences::new())
            .unwrap_err(),
        FsError::PermissionDenied("/.secret".to_string())
    );
}

#[test]
fn test_size_sort_keeps_directories_first() {
    let sandbox = mixed();
    let request = ListingRequest {
        sort: Some("size".to_string()),
        ..ListingRequest::default()
    };
    let listing = sandbox
        .list("/mixed", &request, &mut MemoryPreferences::new())
        .unwrap();
    let dirs_then_files: Vec<bool> = listing.items.iter().map(|e| e.is_dir).collect();
    assert_eq!(dirs_then_files, vec![true, true, false, false, false, false, false]);
    assert_eq!(
        names(&listing.items[2..]),
        vec!["a.txt", "b.txt", "c.txt", "D.txt", "e.txt"]
    );

    let request = ListingRequest {
        sort: Some("size".to_string()),
        order: Some("desc".to_string()),
        ..ListingRequest::default()
    };
    let listing = sandbox
        .list("/mixed", &request, &mut MemoryPreferences::new())
        .unwrap();
    assert_eq!(listing.items[0].name, "e.txt");
    assert!(listing.items[5].is_dir && listing.items[6].is_dir);
}

#[test]
fn test_name_sort_is_stable() {
    let sandbox = mixed();
    let mut prefs = MemoryPreferences::new();
    let first = sandbox.list("/mixed", &ListingRequest::default(), &mut prefs).unwrap();
    let second = sandbox.list("/mixed", &ListingRequest::default(), &mut prefs).unwrap();
    assert_eq!(names(&first.items), names(&second.items));
    assert_eq!(
        names(&first.items),
        vec!["Alpha", "zeta", "a.txt", "b.txt", "c.txt", "D.txt", "e.txt"]
    );
}

#[test]
fn test_preferences_carry_between_requests() {
    let sandbox = mixed();
    let mut prefs = MemoryPreferences::new();

    let explicit = ListingRequest {
        sort: Some("size".to_string()),
        order: Some("desc".to_string()),
        ..ListingRequest::default()
    };
    sandbox.list("/mixed", &explicit, &mut prefs).unwrap();

    let listing = sandbox
        .list("/mixed", &ListingRequest::default(), &mut prefs)
        .unwrap();
    assert_eq!((listing.sort, listing.order), (SortKey::Size, SortOrder::Desc));

    let bogus = ListingRequest {
        sort: Some("colour".to_string()),
        ..ListingRequest::default()
    };
    let listing = sandbox.list("/mixed", &bogus, &mut prefs).unwrap();
    assert_eq!(listing.sort, SortKey::Name);
    assert_eq!(prefs.load("sort").as_deref(), Some("size"));
}

#[test]
fn test_listing_serializes_for_outer_layers() {
    let sandbox = mixed();
    let request = ListingRequest {
        limit: Some(1),
        ..ListingRequest::default()
    };
    let listing = sandbox
        .list("/mixed", &request, &mut MemoryPreferences::new())
        .unwrap();
    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(json["num_dirs"], 2);
    assert_eq!(json["items_limited_to"], 1);
    assert_eq!(json["sort"], "name");
    assert_eq!(json["items"][0]["path"], "/mixed/Alpha");
}
