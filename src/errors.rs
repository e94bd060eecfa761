/*!
 * Error Types
 * Engine errors with stable kinds, miette diagnostics and serde support
 */

use std::fmt;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vfs::VfsError;

/// Engine operation result
///
/// # Must Use
/// Sandbox operations can fail and must be handled to prevent data loss
#[must_use = "sandbox operations can fail and must be handled"]
pub type FsResult<T> = Result<T, FsError>;

/// Stable error kind for outer layers to branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidPath,
    InvalidOperation,
    PermissionDenied,
    NotExist,
    IsDirectory,
    InvalidOption,
    Io,
    Partial,
    Interrupted,
}

impl ErrorKind {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPath => "invalid_path",
            Self::InvalidOperation => "invalid_operation",
            Self::PermissionDenied => "permission_denied",
            Self::NotExist => "not_exist",
            Self::IsDirectory => "is_directory",
            Self::InvalidOption => "invalid_option",
            Self::Io => "io",
            Self::Partial => "partial",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sandbox engine errors
///
/// Messages carry virtual paths only. The sandbox root never appears in
/// an error produced by the engine.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum FsError {
    #[error("Invalid path: {0}")]
    #[diagnostic(
        code(scopefs::invalid_path),
        help("Paths must stay inside the sandbox and cannot contain NUL bytes or host separators.")
    )]
    InvalidPath(String),

    #[error("Invalid operation: {0}")]
    #[diagnostic(
        code(scopefs::invalid_operation),
        help("The sandbox root cannot be moved or removed, and source and destination must differ.")
    )]
    InvalidOperation(String),

    #[error("Permission denied: {0}")]
    #[diagnostic(
        code(scopefs::permission_denied),
        help("A global or per-user rule denies this path.")
    )]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    #[diagnostic(
        code(scopefs::not_exist),
        help("The path does not exist in the sandbox.")
    )]
    NotExist(String),

    #[error("Is a directory: {0}")]
    #[diagnostic(
        code(scopefs::is_directory),
        help("This operation needs a regular file.")
    )]
    IsDirectory(String),

    #[error("Invalid option: {0}")]
    #[diagnostic(
        code(scopefs::invalid_option),
        help("Check the option name. Checksums support md5, sha1, sha256 and sha512.")
    )]
    InvalidOption(String),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(scopefs::io_error),
        help("The underlying store failed. Check the host filesystem.")
    )]
    Io(String),

    #[error("{0}")]
    #[diagnostic(
        code(scopefs::partial),
        help("Some entries were processed. Each line names an entry that failed.")
    )]
    Partial(AggregateError),

    #[error("Interrupted: {0}")]
    #[diagnostic(
        code(scopefs::interrupted),
        help("A walk hook stopped the operation before it finished.")
    )]
    Interrupted(String),
}

impl FsError {
    /// Stable kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath(_) => ErrorKind::InvalidPath,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::NotExist(_) => ErrorKind::NotExist,
            Self::IsDirectory(_) => ErrorKind::IsDirectory,
            Self::InvalidOption(_) => ErrorKind::InvalidOption,
            Self::Io(_) => ErrorKind::Io,
            Self::Partial(_) => ErrorKind::Partial,
            Self::Interrupted(_) => ErrorKind::Interrupted,
        }
    }

    /// Convert a store error, naming the entry by its virtual path
    ///
    /// Store messages hold host paths, so only the kind survives and the
    /// message is rebuilt from `virtual_path`.
    pub fn from_vfs(err: VfsError, virtual_path: &str) -> Self {
        tracing::debug!(path = %virtual_path, error = %err, "store error");
        match err {
            VfsError::NotFound(_) => Self::NotExist(virtual_path.to_string()),
            VfsError::PermissionDenied(_) => Self::PermissionDenied(virtual_path.to_string()),
            VfsError::IsADirectory(_) => Self::IsDirectory(virtual_path.to_string()),
            VfsError::InvalidPath(_) => Self::InvalidPath(virtual_path.to_string()),
            other => Self::Io(format!("{}: {}", virtual_path, store_failure(&other))),
        }
    }

    /// Wrap a raw I/O error from a stream copy or read
    pub fn io(err: &std::io::Error, virtual_path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotExist(virtual_path.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied(virtual_path.to_string())
            }
            kind => Self::Io(format!("{}: {}", virtual_path, kind)),
        }
    }
}

/// Short, path-free description of a store failure
fn store_failure(err: &VfsError) -> &'static str {
    match err {
        VfsError::NotFound(_) => "not found",
        VfsError::AlreadyExists(_) => "already exists",
        VfsError::PermissionDenied(_) => "permission denied",
        VfsError::NotADirectory(_) => "not a directory",
        VfsError::IsADirectory(_) => "is a directory",
        VfsError::InvalidPath(_) => "invalid path",
        VfsError::IoError(_) => "i/o failure",
        VfsError::NotSupported(_) => "not supported",
        VfsError::InvalidArgument(_) => "invalid argument",
        VfsError::OutOfSpace => "out of space",
        VfsError::ReadOnly => "read-only store",
    }
}

impl From<VfsError> for FsError {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::NotFound(msg) => Self::NotExist(msg),
            VfsError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            VfsError::IsADirectory(msg) => Self::IsDirectory(msg),
            VfsError::InvalidPath(msg) => Self::InvalidPath(msg),
            other => Self::Io(other.to_string()),
        }
    }
}

/// One failed entry of a best-effort walk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Failure {
    /// Virtual path of the entry that failed
    pub path: String,
    pub error: FsError,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

/// Every failure collected by a recursive copy, delete or usage walk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateError {
    pub failures: Vec<Failure>,
}

impl AggregateError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; nested aggregates are flattened into this one
    pub fn push(&mut self, path: impl Into<String>, error: FsError) {
        match error {
            FsError::Partial(nested) => self.failures.extend(nested.failures),
            error => self.failures.push(Failure {
                path: path.into(),
                error,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Failure> {
        self.failures.iter()
    }

    /// `Ok` when nothing failed, otherwise `FsError::Partial`
    pub fn into_result(self) -> FsResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FsError::Partial(self))
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}
