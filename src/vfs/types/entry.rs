/*!
 * VFS Directory Entry
 * One child as reported by a directory read
 */

use super::errors::VfsError;
use super::file_type::FileType;
use crate::core::serde::is_default;
use serde::{Deserialize, Deserializer, Serialize};

/// Directory entry with validated name
///
/// Entry names must be non-empty and cannot contain null bytes or path separators.
/// The file type is the type of the entry itself: a symlink reports `Symlink`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    #[serde(deserialize_with = "deserialize_valid_filename")]
    pub name: String,
    #[serde(skip_serializing_if = "is_default", default)]
    pub file_type: FileType,
}

impl Entry {
    /// Create a new directory entry with validation
    pub fn new(name: String, file_type: FileType) -> Result<Self, VfsError> {
        Self::validate_name(&name)?;
        Ok(Self { name, file_type })
    }

    /// Create a new entry without validation (backends that read names from a real directory)
    pub(crate) fn new_unchecked(name: String, file_type: FileType) -> Self {
        Self { name, file_type }
    }

    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    /// Validate a single path segment
    pub fn validate_name(name: &str) -> Result<(), VfsError> {
        name_problem(name).map_or(Ok(()), |msg| Err(VfsError::InvalidPath(msg.into())))
    }
}

fn name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("entry name cannot be empty")
    } else if name.contains('\0') {
        Some("entry name cannot contain null bytes")
    } else if name.contains('/') || name.contains('\\') {
        Some("entry name cannot contain path separators")
    } else if name == "." || name == ".." {
        Some("entry name cannot be a relative segment")
    } else {
        None
    }
}

/// Deserialize and validate filename
fn deserialize_valid_filename<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    match name_problem(&name) {
        Some(msg) => Err(serde::de::Error::custom(msg)),
        None => Ok(name),
    }
}
