/*!
 * Filesystem Node Types
 * Internal representation of files, directories and special nodes
 */

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use super::super::types::{FileType, Metadata, Permissions};

/// In-memory filesystem node
#[derive(Debug, Clone)]
pub(in crate::vfs) enum Node {
    File {
        data: Vec<u8>,
        permissions: Permissions,
        modified: SystemTime,
    },
    Directory {
        children: HashMap<String, PathBuf>,
        permissions: Permissions,
        modified: SystemTime,
    },
    /// Device, fifo or socket placeholder; has no readable contents
    Special {
        file_type: FileType,
        permissions: Permissions,
        modified: SystemTime,
    },
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    pub fn file_type(&self) -> FileType {
        match self {
            Node::File { .. } => FileType::File,
            Node::Directory { .. } => FileType::Directory,
            Node::Special { file_type, .. } => *file_type,
        }
    }

    pub fn permissions(&self) -> Permissions {
        match self {
            Node::File { permissions, .. }
            | Node::Directory { permissions, .. }
            | Node::Special { permissions, .. } => *permissions,
        }
    }

    pub fn set_permissions(&mut self, perms: Permissions) {
        match self {
            Node::File { permissions, .. }
            | Node::Directory { permissions, .. }
            | Node::Special { permissions, .. } => *permissions = perms,
        }
    }

    /// Bytes of file data held by this node
    pub fn data_len(&self) -> usize {
        match self {
            Node::File { data, .. } => data.len(),
            _ => 0,
        }
    }

    pub fn metadata(&self) -> Metadata {
        let modified = match self {
            Node::File { modified, .. }
            | Node::Directory { modified, .. }
            | Node::Special { modified, .. } => *modified,
        };

        Metadata {
            file_type: self.file_type(),
            size: self.data_len() as u64,
            permissions: self.permissions(),
            modified,
        }
    }
}
