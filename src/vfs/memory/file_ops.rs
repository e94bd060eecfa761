/*!
 * File Operations Implementation
 * Reading, writing and creating file nodes
 */

use std::io::Cursor;
use std::path::Path;
use std::time::SystemTime;

use super::super::traits::OpenFile;
use super::super::types::*;
use super::file_handle::MemFile;
use super::node::Node;
use super::MemFS;

impl MemFS {
    pub(super) fn open_impl(&self, path: &Path) -> VfsResult<Box<dyn OpenFile>> {
        let path = self.normalize(path);

        match self.nodes.get(&path).map(|n| n.clone()) {
            Some(Node::File { data, .. }) => Ok(Box::new(MemFile::reader(
                self.clone(),
                path,
                Cursor::new(data),
            ))),
            Some(Node::Directory { .. }) => Err(VfsError::IsADirectory(path.display().to_string())),
            Some(Node::Special { file_type, .. }) => Err(VfsError::NotSupported(format!(
                "cannot open {} {}",
                file_type,
                path.display()
            ))),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    pub(super) fn create_impl(&self, path: &Path, perms: Permissions) -> VfsResult<Box<dyn OpenFile>> {
        let path = self.normalize(path);
        // Truncate up front so a create without writes still leaves an empty file
        self.store_file(&path, Vec::new(), perms, true)?;
        Ok(Box::new(MemFile::writer(self.clone(), path, perms)))
    }

    /// Insert or replace a file node, accounting for capacity
    ///
    /// An open write handle keeps writing even when the file mode is
    /// read-only, so handles pass `enforce_readonly = false`.
    pub(super) fn store_file(
        &self,
        path: &Path,
        data: Vec<u8>,
        perms: Permissions,
        enforce_readonly: bool,
    ) -> VfsResult<()> {
        let path = self.normalize(path);
        let parent = self.ensure_parent(&path)?;

        let old = match self.nodes.get(&path).map(|n| n.clone()) {
            Some(Node::Directory { .. }) => {
                return Err(VfsError::IsADirectory(path.display().to_string()))
            }
            Some(node) => {
                if enforce_readonly && node.permissions().is_readonly() {
                    return Err(VfsError::PermissionDenied(format!(
                        "file is readonly: {}",
                        path.display()
                    )));
                }
                Some((node.data_len(), node.permissions()))
            }
            None => None,
        };
        // Existing files keep their mode, like O_TRUNC on a real filesystem
        let perms = old.map_or(perms, |(_, existing)| existing);
        let old_size = old.map(|(size, _)| size);

        // Reserve only the growth; shrinking releases afterwards
        let new_size = data.len();
        let growth = new_size.saturating_sub(old_size.unwrap_or(0));
        self.check_and_reserve_space(growth)?;

        if old_size.is_none() {
            let name = self.file_name(&path)?;
            if let Err(e) = self.add_child(&parent, &name, &path) {
                self.release_space(growth);
                return Err(e);
            }
        }

        self.nodes.insert(
            path,
            Node::File {
                data,
                permissions: perms,
                modified: SystemTime::now(),
            },
        );

        if let Some(old) = old_size {
            if old > new_size {
                self.release_space(old - new_size);
            }
        }

        Ok(())
    }

    /// Create a special node (fifo, socket, device) with no contents
    pub fn mknod(&self, path: &Path, file_type: FileType) -> VfsResult<()> {
        if !file_type.is_special() {
            return Err(VfsError::InvalidArgument(format!(
                "mknod needs a special file type, got {}",
                file_type
            )));
        }

        let path = self.normalize(path);
        let parent = self.ensure_parent(&path)?;
        if self.nodes.contains_key(&path) {
            return Err(VfsError::AlreadyExists(path.display().to_string()));
        }

        let name = self.file_name(&path)?;
        self.add_child(&parent, &name, &path)?;
        self.nodes.insert(
            path,
            Node::Special {
                file_type,
                permissions: Permissions::readwrite(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }
}
