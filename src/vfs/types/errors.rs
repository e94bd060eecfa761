/*!
 * VFS Error Types
 * Structured, type-safe error handling for store operations
 */

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// VFS operation result
///
/// # Must Use
/// Store operations can fail and must be handled to prevent data loss
#[must_use = "VFS operations can fail and must be handled"]
pub type VfsResult<T> = Result<T, VfsError>;

/// Store errors
///
/// All error variants include context strings that should be non-empty.
/// Serialization uses tagged enum pattern for type safety.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum VfsError {
    #[error("Not found: {0}")]
    NotFound(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Already exists: {0}")]
    AlreadyExists(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Permission denied: {0}")]
    PermissionDenied(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not a directory: {0}")]
    NotADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Is a directory: {0}")]
    IsADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Invalid path: {0}")]
    InvalidPath(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("I/O error: {0}")]
    IoError(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not supported: {0}")]
    NotSupported(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Out of space")]
    OutOfSpace,

    #[error("Read-only filesystem")]
    ReadOnly,
}

impl VfsError {
    /// Convert std::io::Error to VfsError, keeping the operation context
    pub fn from_io(e: std::io::Error, context: impl Into<String>) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::NotFound => VfsError::NotFound(context.into()),
            ErrorKind::PermissionDenied => VfsError::PermissionDenied(context.into()),
            ErrorKind::AlreadyExists => VfsError::AlreadyExists(context.into()),
            _ => VfsError::IoError(format!("{}: {}", context.into(), e)),
        }
    }
}

/// Deserialize and validate non-empty string for error messages
pub(super) fn deserialize_nonempty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("error message must not be empty"));
    }
    Ok(s)
}
