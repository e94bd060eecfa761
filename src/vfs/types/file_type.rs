/*!
 * VFS File Type Enum
 * Defines the type of store objects
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// File type enumeration with complete serde support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    File,
    Directory,
    Symlink,
    #[serde(rename = "block_device")]
    BlockDevice,
    #[serde(rename = "char_device")]
    CharDevice,
    Fifo,
    Socket,
    #[default]
    Unknown,
}

impl FileType {
    /// Devices, pipes and sockets: anything whose contents must not be read
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self,
            FileType::BlockDevice | FileType::CharDevice | FileType::Fifo | FileType::Socket
        )
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileType::File => write!(f, "file"),
            FileType::Directory => write!(f, "directory"),
            FileType::Symlink => write!(f, "symlink"),
            FileType::BlockDevice => write!(f, "block device"),
            FileType::CharDevice => write!(f, "char device"),
            FileType::Fifo => write!(f, "fifo"),
            FileType::Socket => write!(f, "socket"),
            FileType::Unknown => write!(f, "unknown"),
        }
    }
}
