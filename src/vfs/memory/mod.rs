/*!
 * In-Memory Filesystem Backend
 * Fast, volatile store for tests and scratch sandboxes
 */

mod dir_ops;
mod file_handle;
mod file_ops;
mod metadata_ops;
mod node;

use ahash::RandomState;
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use super::types::*;
use node::Node;

/// In-memory store implementation
///
/// Has no symlink capability: `lstat_if_supported`, `readlink_if_supported`
/// and `symlink_if_supported` all report the capability as absent.
///
/// # Performance
/// - Cache-line aligned to prevent false sharing of the atomic size counter
#[repr(C, align(64))]
#[derive(Debug, Clone)]
pub struct MemFS {
    pub(super) nodes: Arc<DashMap<PathBuf, Node, RandomState>>,
    pub(super) max_size: Option<usize>,
    pub(super) current_size: Arc<AtomicUsize>,
}

impl MemFS {
    /// Create new in-memory store containing only `/`
    pub fn new() -> Self {
        let nodes = DashMap::with_hasher(RandomState::new());

        nodes.insert(
            PathBuf::from("/"),
            Node::Directory {
                children: HashMap::default(),
                permissions: Permissions::directory(),
                modified: SystemTime::now(),
            },
        );

        Self {
            nodes: Arc::new(nodes),
            max_size: None,
            current_size: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create with size limit (total bytes of file data)
    pub fn with_capacity(max_size: usize) -> Self {
        let mut fs = Self::new();
        fs.max_size = Some(max_size);
        fs
    }

    /// Bytes of file data currently stored
    pub fn used_bytes(&self) -> usize {
        self.current_size.load(Ordering::SeqCst)
    }

    /// Normalize path (make absolute and clean)
    pub(super) fn normalize(&self, path: &Path) -> PathBuf {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new("/").join(path)
        };

        // Handles ., .., multiple /
        PathBuf::from(path_clean::clean(&path))
    }

    /// Check if space is available and reserve it atomically
    pub(super) fn check_and_reserve_space(&self, additional: usize) -> VfsResult<()> {
        if let Some(max) = self.max_size {
            loop {
                let current = self.current_size.load(Ordering::SeqCst);
                if current + additional > max {
                    return Err(VfsError::OutOfSpace);
                }
                if self
                    .current_size
                    .compare_exchange(
                        current,
                        current + additional,
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    )
                    .is_ok()
                {
                    return Ok(());
                }
            }
        }
        self.current_size.fetch_add(additional, Ordering::SeqCst);
        Ok(())
    }

    /// Release reserved space
    pub(super) fn release_space(&self, amount: usize) {
        let _ = self
            .current_size
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_sub(amount))
            });
    }

    /// Get file name from path
    pub(super) fn file_name(&self, path: &Path) -> VfsResult<String> {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| VfsError::InvalidPath(format!("invalid path: {}", path.display())))
    }

    /// Ensure parent directory exists and is writable
    pub(super) fn ensure_parent(&self, path: &Path) -> VfsResult<PathBuf> {
        let parent = path
            .parent()
            .ok_or_else(|| VfsError::InvalidPath(format!("no parent: {}", path.display())))?
            .to_path_buf();

        match self.nodes.get(&parent).map(|n| n.clone()) {
            Some(Node::Directory { permissions, .. }) => {
                if permissions.is_readonly() {
                    return Err(VfsError::PermissionDenied(format!(
                        "parent directory is readonly: {}",
                        parent.display()
                    )));
                }
                Ok(parent)
            }
            Some(_) => Err(VfsError::NotADirectory(parent.display().to_string())),
            None => Err(VfsError::NotFound(format!(
                "parent directory not found: {}",
                parent.display()
            ))),
        }
    }

    /// Add child to parent directory
    pub(super) fn add_child(&self, parent: &Path, name: &str, child: &Path) -> VfsResult<()> {
        match self.nodes.get_mut(parent) {
            Some(mut node) => match node.value_mut() {
                Node::Directory {
                    children, modified, ..
                } => {
                    children.insert(name.to_string(), child.to_path_buf());
                    *modified = SystemTime::now();
                    Ok(())
                }
                _ => Err(VfsError::NotADirectory(parent.display().to_string())),
            },
            None => Err(VfsError::NotFound(parent.display().to_string())),
        }
    }

    /// Remove child from parent directory
    pub(super) fn remove_child(&self, parent: &Path, name: &str) -> VfsResult<()> {
        match self.nodes.get_mut(parent) {
            Some(mut node) => match node.value_mut() {
                Node::Directory {
                    children, modified, ..
                } => {
                    children.remove(name);
                    *modified = SystemTime::now();
                    Ok(())
                }
                _ => Err(VfsError::NotADirectory(parent.display().to_string())),
            },
            None => Err(VfsError::NotFound(parent.display().to_string())),
        }
    }
}

impl Default for MemFS {
    fn default() -> Self {
        Self::new()
    }
}
