/*!
 * Confined Path Handling
 * Maps slash-rooted virtual paths onto host paths that never leave the sandbox root
 */

use std::fmt;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use serde::{Deserialize, Serialize};

use crate::errors::{FsError, FsResult};
use crate::vfs::Entry;

/// Reject characters that can smuggle an escape past lexical cleaning
fn check_raw(raw: &str) -> FsResult<()> {
    if raw.contains('\0') {
        return Err(FsError::InvalidPath("path contains a NUL byte".to_string()));
    }
    if MAIN_SEPARATOR != '/' && raw.contains(MAIN_SEPARATOR) {
        return Err(FsError::InvalidPath(format!(
            "path contains host separator {:?}",
            MAIN_SEPARATOR
        )));
    }
    Ok(())
}

/// Normalized, slash-rooted path as the client sees it
///
/// Always starts with `/`, never contains `.`, `..` or empty segments, and
/// never ends with `/` unless it is the root. Cleaning is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VirtualPath(String);

impl VirtualPath {
    /// The virtual root `/`
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Clean `raw` as `"/" + raw`, rejecting NUL bytes and host separators
    pub fn parse(raw: &str) -> FsResult<Self> {
        check_raw(raw)?;

        let cleaned = PathBuf::from(path_clean::clean(format!("/{}", raw)));
        let segments: Vec<&str> = cleaned
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();

        Ok(Self::from_segments(&segments))
    }

    fn from_segments(segments: &[&str]) -> Self {
        let mut path = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum());
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        if path.is_empty() {
            path.push('/');
        }
        Self(path)
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path segments, empty for the root
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Final segment, or `/` for the root
    #[must_use]
    pub fn name(&self) -> &str {
        self.segments().last().unwrap_or("/")
    }

    /// Parent path; the root is its own parent
    #[must_use]
    pub fn parent(&self) -> Self {
        let segments: Vec<&str> = self.segments().collect();
        match segments.split_last() {
            Some((_, rest)) => Self::from_segments(rest),
            None => Self::root(),
        }
    }

    /// Append a single entry name
    pub fn join(&self, name: &str) -> FsResult<Self> {
        Entry::validate_name(name).map_err(|_| {
            FsError::InvalidPath(format!("invalid entry name {:?} under {}", name, self))
        })?;

        if self.is_root() {
            Ok(Self(format!("/{}", name)))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// True when `other` lies strictly below this path
    #[must_use]
    pub fn is_ancestor_of(&self, other: &VirtualPath) -> bool {
        if self == other {
            return false;
        }
        self.is_root() || other.0.starts_with(&format!("{}/", self.0))
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VirtualPath {
    type Error = FsError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<VirtualPath> for String {
    fn from(path: VirtualPath) -> Self {
        path.0
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Host directory a user is confined to
///
/// Never shown to callers: errors and listings only carry virtual paths.
#[derive(Clone, PartialEq, Eq)]
pub struct SandboxRoot {
    path: PathBuf,
}

impl SandboxRoot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: PathBuf::from(path_clean::clean(path.as_ref())),
        }
    }

    #[inline]
    pub(crate) fn as_path(&self) -> &Path {
        &self.path
    }

    /// Resolve a raw virtual path to a confined host path
    ///
    /// Pure path algebra; the store is never touched.
    pub fn resolve(&self, raw: &str) -> FsResult<ResolvedPath> {
        let virtual_path = VirtualPath::parse(raw)?;
        self.resolve_virtual(virtual_path)
    }

    /// Resolve an already-normalized virtual path
    pub fn resolve_virtual(&self, virtual_path: VirtualPath) -> FsResult<ResolvedPath> {
        let mut real = self.path.clone();
        for segment in virtual_path.segments() {
            // Each segment must stay one plain component once the host parses it,
            // which rules out drive letters and UNC prefixes
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => real.push(segment),
                _ => {
                    return Err(FsError::InvalidPath(format!(
                        "segment {:?} is not a plain name",
                        segment
                    )))
                }
            }
        }

        if !real.starts_with(&self.path) {
            return Err(FsError::InvalidPath(virtual_path.to_string()));
        }

        Ok(ResolvedPath { virtual_path, real })
    }

    /// True when `resolved` is the sandbox root itself
    #[inline]
    #[must_use]
    pub fn is_root(&self, resolved: &ResolvedPath) -> bool {
        resolved.real == self.path
    }

    /// Map a host path under the root back to its virtual path
    pub fn virtualize(&self, real: &Path) -> Option<VirtualPath> {
        let cleaned = PathBuf::from(path_clean::clean(real));
        let rest = cleaned.strip_prefix(&self.path).ok()?;
        let mut segments = Vec::new();
        for component in rest.components() {
            match component {
                Component::Normal(s) => segments.push(s.to_str()?),
                _ => return None,
            }
        }
        Some(VirtualPath::from_segments(&segments))
    }
}

impl fmt::Debug for SandboxRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SandboxRoot(..)")
    }
}

/// A virtual path together with the host path it resolves to
///
/// The host path is always the sandbox root or a descendant of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    virtual_path: VirtualPath,
    real: PathBuf,
}

impl ResolvedPath {
    #[inline]
    pub fn virtual_path(&self) -> &VirtualPath {
        &self.virtual_path
    }

    /// Host path handed to the store
    #[inline]
    pub fn real_path(&self) -> &Path {
        &self.real
    }

    /// Entry name, `/` for the root
    #[inline]
    pub fn name(&self) -> &str {
        self.virtual_path.name()
    }

    /// Resolve a direct child by name
    pub fn child(&self, name: &str) -> FsResult<ResolvedPath> {
        let virtual_path = self.virtual_path.join(name)?;
        Ok(ResolvedPath {
            virtual_path,
            real: self.real.join(name),
        })
    }

    /// Parent entry; the root resolves to itself
    pub fn parent(&self) -> ResolvedPath {
        if self.virtual_path.is_root() {
            return self.clone();
        }
        ResolvedPath {
            virtual_path: self.virtual_path.parent(),
            real: self
                .real
                .parent()
                .map_or_else(|| self.real.clone(), Path::to_path_buf),
        }
    }

    /// Sibling with a different name in the same directory
    pub fn with_name(&self, name: &str) -> FsResult<ResolvedPath> {
        self.parent().child(name)
    }
}
