/*!
 * VFS Traits
 * Core store abstraction traits
 */

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::types::*;

/// Hierarchical store trait
///
/// Every path handed to a store has already been confined by the sandbox
/// resolver. Optional capabilities (`*_if_supported`) return `None` when the
/// backend cannot provide them, so callers branch instead of probing types.
pub trait FileSystem: Send + Sync {
    /// Get metadata, following symlinks
    fn stat(&self, path: &Path) -> VfsResult<Metadata>;

    /// Get metadata of the entry itself without following a final symlink
    fn lstat_if_supported(&self, _path: &Path) -> Option<VfsResult<Metadata>> {
        None
    }

    /// Open a file for reading
    fn open(&self, path: &Path) -> VfsResult<Box<dyn OpenFile>>;

    /// List directory contents (one level, unordered)
    fn read_dir(&self, path: &Path) -> VfsResult<Vec<Entry>>;

    /// Create directory (including parents)
    fn mkdir_all(&self, path: &Path, perms: Permissions) -> VfsResult<()>;

    /// Move/rename an entry
    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()>;

    /// Remove a file, symlink or empty directory
    fn remove(&self, path: &Path) -> VfsResult<()>;

    /// Remove an entry and everything below it in one call
    fn remove_all(&self, path: &Path) -> VfsResult<()>;

    /// Create (or truncate) a file and open it for writing
    fn create(&self, path: &Path, perms: Permissions) -> VfsResult<Box<dyn OpenFile>>;

    /// Set permission bits
    fn chmod(&self, path: &Path, perms: Permissions) -> VfsResult<()>;

    /// Read a symlink's target
    fn readlink_if_supported(&self, _path: &Path) -> Option<VfsResult<PathBuf>> {
        None
    }

    /// Create a symlink at `link` pointing at `target`
    fn symlink_if_supported(&self, _target: &Path, _link: &Path) -> Option<VfsResult<()>> {
        None
    }

    /// Get store name/type
    fn name(&self) -> &str;

    /// Check if store is read-only
    fn readonly(&self) -> bool {
        false
    }

    /// Check existence without following a final symlink when possible
    fn exists(&self, path: &Path) -> bool {
        match self.lstat_if_supported(path) {
            Some(result) => result.is_ok(),
            None => self.stat(path).is_ok(),
        }
    }
}

/// Open file handle trait
///
/// Automatically closed (and flushed) when dropped.
pub trait OpenFile: Read + Write + Send {
    /// Sync file data to storage
    fn sync(&mut self) -> VfsResult<()>;
}
