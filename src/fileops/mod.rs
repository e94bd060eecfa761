/*!
 * File Operations
 * Confined mkdir, copy, move, recursive delete and disk usage
 *
 * Every operation takes paths already resolved by the sandbox and checked
 * against the access policy. Guards that need no I/O (root targets, identical
 * source and destination, moving a directory into itself) run before the
 * store is touched. Recursive walks visit children one at a time, call the
 * walk hook before each visit, and report every failed child together.
 */

mod copy;
mod remove;
mod usage;
pub mod walk;

use tracing::{info, instrument};

use crate::errors::{FsError, FsResult};
use crate::files::entry::extension;
use crate::sandbox::{ResolvedPath, SandboxRoot};
use crate::vfs::{FileSystem, Metadata, Permissions, VfsResult};

pub use usage::Usage;
pub use walk::{Deadline, NoHook, WalkHook};

/// Confined mutating operations over one store and sandbox root
pub struct FileOps<'a> {
    fs: &'a dyn FileSystem,
    root: &'a SandboxRoot,
    dir_mode: Permissions,
    file_mode: Permissions,
    hook: &'a dyn WalkHook,
}

impl<'a> FileOps<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: &'a SandboxRoot) -> Self {
        Self {
            fs,
            root,
            dir_mode: Permissions::directory(),
            file_mode: Permissions::readwrite(),
            hook: &NoHook,
        }
    }

    /// Modes for created directories and for files before their source mode is applied
    pub fn with_modes(mut self, dir_mode: Permissions, file_mode: Permissions) -> Self {
        self.dir_mode = dir_mode;
        self.file_mode = file_mode;
        self
    }

    pub fn with_hook(mut self, hook: &'a dyn WalkHook) -> Self {
        self.hook = hook;
        self
    }

    /// Stat without following a final link when the store can
    pub(crate) fn lstat(&self, path: &ResolvedPath) -> VfsResult<Metadata> {
        match self.fs.lstat_if_supported(path.real_path()) {
            Some(result) => result,
            None => self.fs.stat(path.real_path()),
        }
    }

    fn refuse_root(&self, path: &ResolvedPath, op: &str) -> FsResult<()> {
        if self.root.is_root(path) {
            return Err(FsError::InvalidOperation(format!(
                "cannot {} the sandbox root",
                op
            )));
        }
        Ok(())
    }

    /// Guards shared by copy and move; no I/O
    fn check_pair(&self, src: &ResolvedPath, dst: &ResolvedPath, op: &str) -> FsResult<()> {
        if self.root.is_root(src) || self.root.is_root(dst) {
            return Err(FsError::InvalidOperation(format!(
                "cannot {} from or to the sandbox root",
                op
            )));
        }
        if src.virtual_path() == dst.virtual_path() {
            return Err(FsError::InvalidOperation(format!(
                "cannot {} {} onto itself",
                op,
                src.virtual_path()
            )));
        }
        if src.virtual_path().is_ancestor_of(dst.virtual_path()) {
            return Err(FsError::InvalidOperation("source is parent".to_string()));
        }
        Ok(())
    }

    /// Create a directory and any missing parents
    #[instrument(skip_all, fields(path = %path.virtual_path()))]
    pub fn mkdir(&self, path: &ResolvedPath) -> FsResult<()> {
        self.refuse_root(path, "create")?;
        self.fs
            .mkdir_all(path.real_path(), self.dir_mode)
            .map_err(|e| FsError::from_vfs(e, path.virtual_path().as_str()))?;
        info!("directory created");
        Ok(())
    }

    /// Move (rename) an entry, creating the destination's parents
    #[instrument(skip_all, fields(src = %src.virtual_path(), dst = %dst.virtual_path()))]
    pub fn rename(&self, src: &ResolvedPath, dst: &ResolvedPath) -> FsResult<()> {
        self.check_pair(src, dst, "move")?;

        let parent = dst.parent();
        self.fs
            .mkdir_all(parent.real_path(), self.dir_mode)
            .map_err(|e| FsError::from_vfs(e, parent.virtual_path().as_str()))?;
        self.fs
            .rename(src.real_path(), dst.real_path())
            .map_err(|e| FsError::from_vfs(e, src.virtual_path().as_str()))?;
        info!("entry moved");
        Ok(())
    }

    /// First of `dst`, `name(1).ext`, `name(2).ext`, ... that does not exist
    pub fn next_available(&self, dst: &ResolvedPath) -> FsResult<ResolvedPath> {
        if !self.fs.exists(dst.real_path()) {
            return Ok(dst.clone());
        }

        let name = dst.name();
        let ext = extension(name);
        let base = &name[..name.len() - ext.len()];

        let mut counter: u64 = 1;
        loop {
            let candidate = dst.with_name(&format!("{}({}){}", base, counter, ext))?;
            if !self.fs.exists(candidate.real_path()) {
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}
