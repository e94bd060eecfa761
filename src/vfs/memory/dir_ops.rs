/*!
 * Directory Operations Implementation
 * Listing, creating and removing directory nodes
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::super::types::*;
use super::node::Node;
use super::MemFS;

impl MemFS {
    pub(super) fn read_dir_impl(&self, path: &Path) -> VfsResult<Vec<Entry>> {
        let path = self.normalize(path);

        match self.nodes.get(&path).map(|n| n.clone()) {
            Some(Node::Directory { children, .. }) => {
                let mut entries = Vec::with_capacity(children.len());
                for (name, child_path) in children {
                    if let Some(file_type) = self.nodes.get(&child_path).map(|n| n.file_type()) {
                        entries.push(Entry::new_unchecked(name, file_type));
                    }
                }
                Ok(entries)
            }
            Some(_) => Err(VfsError::NotADirectory(path.display().to_string())),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    pub(super) fn mkdir_all_impl(&self, path: &Path, perms: Permissions) -> VfsResult<()> {
        let path = self.normalize(path);

        let mut current = PathBuf::from("/");
        for component in path.components().skip(1) {
            current.push(component);

            match self.nodes.get(&current).map(|n| n.is_dir()) {
                Some(true) => continue,
                Some(false) => return Err(VfsError::NotADirectory(current.display().to_string())),
                None => {}
            }

            // current always has a parent and a name: it starts at "/" and we just pushed
            let parent = self.ensure_parent(&current)?;
            let name = self.file_name(&current)?;

            self.nodes.insert(
                current.clone(),
                Node::Directory {
                    children: HashMap::default(),
                    permissions: perms,
                    modified: SystemTime::now(),
                },
            );
            self.add_child(&parent, &name, &current)?;
        }

        Ok(())
    }

    pub(super) fn remove_impl(&self, path: &Path) -> VfsResult<()> {
        let path = self.normalize(path);
        if path == Path::new("/") {
            return Err(VfsError::InvalidArgument("cannot remove /".to_string()));
        }
        let parent = self.ensure_parent(&path)?;

        let size = match self.nodes.get(&path).map(|n| n.clone()) {
            Some(Node::Directory { children, .. }) if !children.is_empty() => {
                return Err(VfsError::InvalidArgument(format!(
                    "directory not empty: {}",
                    path.display()
                )));
            }
            Some(node) => node.data_len(),
            None => return Err(VfsError::NotFound(path.display().to_string())),
        };

        self.nodes.remove(&path);
        let name = self.file_name(&path)?;
        self.remove_child(&parent, &name)?;
        self.release_space(size);
        Ok(())
    }

    pub(super) fn remove_all_impl(&self, path: &Path) -> VfsResult<()> {
        let path = self.normalize(path);
        if path == Path::new("/") {
            return Err(VfsError::InvalidArgument("cannot remove /".to_string()));
        }
        let parent = self.ensure_parent(&path)?;
        if !self.nodes.contains_key(&path) {
            return Err(VfsError::NotFound(path.display().to_string()));
        }

        // Collect the subtree, then drop it children-first
        let mut to_remove = Vec::new();
        let mut to_visit = vec![path.clone()];
        while let Some(current) = to_visit.pop() {
            if let Some(entry) = self.nodes.get(&current) {
                if let Node::Directory { children, .. } = entry.value() {
                    to_visit.extend(children.values().cloned());
                }
            }
            to_remove.push(current);
        }

        let mut total_size = 0;
        for victim in to_remove.into_iter().rev() {
            if let Some((_, node)) = self.nodes.remove(&victim) {
                total_size += node.data_len();
            }
        }

        let name = self.file_name(&path)?;
        self.remove_child(&parent, &name)?;
        self.release_space(total_size);
        Ok(())
    }
}
