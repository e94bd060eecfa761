/*!
 * VFS Metadata
 * Stat results including modification time and permissions
 */

use super::file_type::FileType;
use super::permissions::Permissions;
use crate::core::serde::{is_default, is_zero_u64, system_time_micros};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Store metadata for a single object
///
/// Timestamps are serialized as microseconds since UNIX epoch.
/// Size and permissions are skipped when they are default values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Metadata {
    pub file_type: FileType,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub size: u64,
    #[serde(skip_serializing_if = "is_default", default)]
    pub permissions: Permissions,
    #[serde(with = "system_time_micros")]
    pub modified: SystemTime,
}

impl Metadata {
    /// Check if this is a directory
    ///
    /// # Performance
    /// Hot path - called for every listed entry
    #[inline(always)]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    /// Check if this is a regular file
    #[inline(always)]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }

    /// Check if this is a symbolic link
    #[inline(always)]
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self.file_type, FileType::Symlink)
    }

    /// Check if this is a special file (device, fifo, socket)
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.file_type.is_special()
    }
}
