/*!
 * Metadata Operations Implementation
 * FileSystem trait methods for metadata and node manipulation
 */

use std::path::{Path, PathBuf};

use super::super::traits::{FileSystem, OpenFile};
use super::super::types::*;
use super::node::Node;
use super::MemFS;

impl MemFS {
    fn rename_impl(&self, from: &Path, to: &Path) -> VfsResult<()> {
        let from = self.normalize(from);
        let to = self.normalize(to);

        if from == to {
            return Ok(());
        }
        if to.starts_with(&from) {
            return Err(VfsError::InvalidArgument(format!(
                "cannot move {} into itself",
                from.display()
            )));
        }

        let from_parent = self.ensure_parent(&from)?;
        let to_parent = self.ensure_parent(&to)?;

        let moving_dir = match self.nodes.get(&from) {
            Some(node) => node.is_dir(),
            None => return Err(VfsError::NotFound(from.display().to_string())),
        };

        // Replacing a file mirrors rename(2); directories are never clobbered
        if let Some(existing) = self.nodes.get(&to).map(|n| n.clone()) {
            if existing.is_dir() || moving_dir {
                return Err(VfsError::AlreadyExists(to.display().to_string()));
            }
            self.nodes.remove(&to);
            self.release_space(existing.data_len());
        }

        // Re-key the whole subtree under the new prefix
        let mut moved: Vec<(PathBuf, Node)> = Vec::new();
        let mut to_visit = vec![from.clone()];
        while let Some(current) = to_visit.pop() {
            if let Some((_, node)) = self.nodes.remove(&current) {
                if let Node::Directory { children, .. } = &node {
                    to_visit.extend(children.values().cloned());
                }
                moved.push((current, node));
            }
        }

        for (old_path, mut node) in moved {
            let suffix = old_path.strip_prefix(&from).unwrap_or(Path::new(""));
            let new_path = if suffix.as_os_str().is_empty() {
                to.clone()
            } else {
                to.join(suffix)
            };
            if let Node::Directory { children, .. } = &mut node {
                for (name, child) in children.iter_mut() {
                    *child = new_path.join(name);
                }
            }
            self.nodes.insert(new_path, node);
        }

        self.remove_child(&from_parent, &self.file_name(&from)?)?;
        self.add_child(&to_parent, &self.file_name(&to)?, &to)?;
        Ok(())
    }
}

impl FileSystem for MemFS {
    fn stat(&self, path: &Path) -> VfsResult<Metadata> {
        let path = self.normalize(path);

        match self.nodes.get(&path) {
            Some(node) => Ok(node.metadata()),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    fn open(&self, path: &Path) -> VfsResult<Box<dyn OpenFile>> {
        self.open_impl(path)
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<Entry>> {
        self.read_dir_impl(path)
    }

    fn mkdir_all(&self, path: &Path, perms: Permissions) -> VfsResult<()> {
        self.mkdir_all_impl(path, perms)
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        self.rename_impl(from, to)
    }

    fn remove(&self, path: &Path) -> VfsResult<()> {
        self.remove_impl(path)
    }

    fn remove_all(&self, path: &Path) -> VfsResult<()> {
        self.remove_all_impl(path)
    }

    fn create(&self, path: &Path, perms: Permissions) -> VfsResult<Box<dyn OpenFile>> {
        self.create_impl(path, perms)
    }

    fn chmod(&self, path: &Path, perms: Permissions) -> VfsResult<()> {
        let path = self.normalize(path);

        match self.nodes.get_mut(&path) {
            Some(mut entry) => {
                entry.value_mut().set_permissions(perms);
                Ok(())
            }
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize(path);
        self.nodes.contains_key(&path)
    }
}
