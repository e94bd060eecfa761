/*!
 * Listing Module
 * One-level directory listings: rule filtering, classification, sort and limit
 */

pub mod preferences;
pub mod sort;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{FsError, FsResult};
use crate::files::{classify, ClassifyOptions, FileEntry};
use crate::permissions::Checker;
use crate::sandbox::{ResolvedPath, SandboxRoot, VirtualPath};
use crate::vfs::FileSystem;

pub use preferences::{resolve_sort, MemoryPreferences, PreferenceStore, ORDER_KEY, SORT_KEY};
pub use sort::{compare, sort_entries, SortKey, SortOrder};

/// Result of listing one directory
///
/// Owned by the request that built it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub path: VirtualPath,
    pub name: String,
    pub items: Vec<FileEntry>,
    pub num_dirs: usize,
    pub num_files: usize,
    pub sort: SortKey,
    pub order: SortOrder,
    /// Set when `items` was cut down to a requested limit
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub items_limited_to: Option<usize>,
}

/// Resolved parameters for one listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingOptions {
    pub sort: SortKey,
    pub order: SortOrder,
    pub limit: Option<usize>,
    pub classify: ClassifyOptions,
}

impl ListingOptions {
    pub fn new(sort: SortKey, order: SortOrder) -> Self {
        Self {
            sort,
            order,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_classify(mut self, classify: ClassifyOptions) -> Self {
        self.classify = classify;
        self
    }
}

/// Raw listing parameters as a caller receives them (query string, say)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingRequest {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<usize>,
}

/// List one directory level
///
/// The directory's own rule is checked before anything is read. Denied
/// children are left out entirely; directories are not expanded.
pub fn list(
    fs: &dyn FileSystem,
    root: &SandboxRoot,
    dir: &ResolvedPath,
    checker: &dyn Checker,
    opts: &ListingOptions,
) -> FsResult<Listing> {
    let virtual_path = dir.virtual_path();
    checker.ensure(virtual_path.as_str())?;

    let children = fs
        .read_dir(dir.real_path())
        .map_err(|e| FsError::from_vfs(e, virtual_path.as_str()))?;

    let mut items = Vec::with_capacity(children.len());
    let mut num_dirs = 0;
    let mut num_files = 0;

    for child in children {
        let child_path = match dir.child(&child.name) {
            Ok(path) => path,
            Err(e) => {
                warn!(dir = %virtual_path, name = ?child.name, error = %e, "skipping unaddressable entry");
                continue;
            }
        };

        if !checker.check(child_path.virtual_path().as_str()) {
            debug!(path = %child_path.virtual_path(), "entry hidden by rules");
            continue;
        }

        let entry = classify(fs, root, &child_path, opts.classify)?;
        if entry.is_dir {
            num_dirs += 1;
        } else {
            num_files += 1;
        }
        items.push(entry);
    }

    sort_entries(&mut items, opts.sort, opts.order);

    let items_limited_to = match opts.limit {
        Some(limit) if limit > 0 && limit <= items.len() => {
            items.truncate(limit);
            Some(limit)
        }
        _ => None,
    };

    debug!(
        path = %virtual_path,
        dirs = num_dirs,
        files = num_files,
        shown = items.len(),
        "listing built"
    );

    Ok(Listing {
        path: virtual_path.clone(),
        name: dir.name().to_string(),
        items,
        num_dirs,
        num_files,
        sort: opts.sort,
        order: opts.order,
        items_limited_to,
    })
}
