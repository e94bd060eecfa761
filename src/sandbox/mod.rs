/*!
 * Sandbox Module
 * Path confinement, engine configuration and the per-user facade
 *
 * ## Request flow
 * 1. Resolve the raw virtual path under the sandbox root (`InvalidPath`)
 * 2. Check both rule tiers (`PermissionDenied`)
 * 3. Only then touch the store
 */

pub mod config;
pub mod path;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::FsResult;
use crate::fileops::{FileOps, NoHook, Usage, WalkHook};
use crate::files::{self, Algorithm, ClassifyOptions, FileEntry};
use crate::listing::{self, resolve_sort, Listing, ListingOptions, ListingRequest, PreferenceStore};
use crate::permissions::{AccessPolicy, Checker};
use crate::vfs::FileSystem;

pub use config::SandboxConfig;
pub use path::{ResolvedPath, SandboxRoot, VirtualPath};

/// What `Sandbox::info` should compute beyond stat
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoOptions {
    /// Assign a category (and subtitles for video)
    pub detect_content: bool,
    /// Report text files as editable
    pub modifiable: bool,
    /// Attach the body of text files
    pub content: bool,
    /// Checksums to compute, keyed by algorithm name in the entry
    pub checksums: Vec<Algorithm>,
}

/// One user's confined view of a store
///
/// Cheap to clone; the store is shared.
#[derive(Clone)]
pub struct Sandbox {
    root: SandboxRoot,
    fs: Arc<dyn FileSystem>,
    policy: AccessPolicy,
    config: SandboxConfig,
}

impl Sandbox {
    pub fn new(root: impl AsRef<Path>, fs: Arc<dyn FileSystem>) -> Self {
        let sandbox = Self {
            root: SandboxRoot::new(root),
            fs,
            policy: AccessPolicy::default(),
            config: SandboxConfig::default(),
        };
        info!(store = sandbox.fs.name(), "sandbox initialized");
        sandbox
    }

    /// Install the two rule tiers
    ///
    /// The configured unmatched decision and dotfile setting override the
    /// policy's own.
    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self.apply_config();
        self
    }

    pub fn with_config(mut self, config: SandboxConfig) -> Self {
        self.config = config;
        self.apply_config();
        self
    }

    fn apply_config(&mut self) {
        self.policy.unmatched = self.config.unmatched;
        self.policy.hide_dotfiles = self.config.hide_dotfiles;
    }

    #[inline]
    pub fn root(&self) -> &SandboxRoot {
        &self.root
    }

    #[inline]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    #[inline]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Resolve `raw` and check it against both rule tiers
    pub fn resolve(&self, raw: &str) -> FsResult<ResolvedPath> {
        let resolved = self.root.resolve(raw)?;
        self.policy.ensure(resolved.virtual_path().as_str())?;
        Ok(resolved)
    }

    fn file_ops<'a>(&'a self, hook: &'a dyn WalkHook) -> FileOps<'a> {
        FileOps::new(self.fs.as_ref(), &self.root)
            .with_modes(self.config.dir_permissions(), self.config.file_permissions())
            .with_hook(hook)
    }

    /// Describe one entry, optionally classified and checksummed
    pub fn info(&self, raw: &str, opts: &InfoOptions) -> FsResult<FileEntry> {
        let path = self.resolve(raw)?;
        let classify_opts = ClassifyOptions {
            detect_content: opts.detect_content,
            modifiable: opts.modifiable,
            read_header: self.config.type_detection_by_header,
            content: opts.content,
        };
        let mut entry = files::classify(self.fs.as_ref(), &self.root, &path, classify_opts)?;

        for algo in &opts.checksums {
            let digest = files::checksum(self.fs.as_ref(), &path, *algo)?;
            entry.checksums.insert(algo.name().to_string(), digest);
        }
        Ok(entry)
    }

    /// List one directory
    ///
    /// Sort and order missing from `request` come from `prefs`; explicit ones
    /// are written back to it.
    pub fn list(
        &self,
        raw: &str,
        request: &ListingRequest,
        prefs: &mut dyn PreferenceStore,
    ) -> FsResult<Listing> {
        // The listing checks the directory itself before reading it
        let dir = self.root.resolve(raw)?;
        let (sort, order) = resolve_sort(
            prefs,
            request.sort.as_deref(),
            request.order.as_deref(),
            self.config.default_sorting(),
        );

        let mut opts = ListingOptions::new(sort, order).with_classify(ClassifyOptions {
            detect_content: true,
            modifiable: true,
            read_header: self.config.type_detection_by_header,
            content: false,
        });
        opts.limit = request.limit;

        debug!(path = %dir.virtual_path(), %sort, %order, "listing directory");
        listing::list(self.fs.as_ref(), &self.root, &dir, &self.policy, &opts)
    }

    /// Lower-case hex digest of a regular file
    pub fn checksum(&self, raw: &str, algo: &str) -> FsResult<String> {
        let path = self.resolve(raw)?;
        let algo: Algorithm = algo.parse()?;
        files::checksum(self.fs.as_ref(), &path, algo)
    }

    pub fn mkdir(&self, raw: &str) -> FsResult<()> {
        let path = self.resolve(raw)?;
        self.file_ops(&NoHook).mkdir(&path)
    }

    pub fn copy(&self, src: &str, dst: &str) -> FsResult<()> {
        self.copy_with(src, dst, &NoHook)
    }

    /// Copy, calling `hook` before every child visit
    pub fn copy_with(&self, src: &str, dst: &str, hook: &dyn WalkHook) -> FsResult<()> {
        let src = self.resolve(src)?;
        let dst = self.resolve(dst)?;
        self.file_ops(hook).copy(&src, &dst)
    }

    pub fn rename(&self, src: &str, dst: &str) -> FsResult<()> {
        let src = self.resolve(src)?;
        let dst = self.resolve(dst)?;
        self.file_ops(&NoHook).rename(&src, &dst)
    }

    pub fn remove(&self, raw: &str) -> FsResult<()> {
        self.remove_with(raw, &NoHook)
    }

    /// Delete, calling `hook` before every child visit
    pub fn remove_with(&self, raw: &str, hook: &dyn WalkHook) -> FsResult<()> {
        let path = self.resolve(raw)?;
        self.file_ops(hook).remove_all(&path)
    }

    pub fn disk_usage(&self, raw: &str, max_depth: usize) -> FsResult<Usage> {
        self.disk_usage_with(raw, max_depth, &NoHook)
    }

    pub fn disk_usage_with(
        &self,
        raw: &str,
        max_depth: usize,
        hook: &dyn WalkHook,
    ) -> FsResult<Usage> {
        let path = self.resolve(raw)?;
        self.file_ops(hook).disk_usage(&path, max_depth)
    }

    /// First free `name(N).ext` variant of `raw`, or `raw` itself when free
    pub fn next_available(&self, raw: &str) -> FsResult<VirtualPath> {
        let path = self.resolve(raw)?;
        let free = self.file_ops(&NoHook).next_available(&path)?;
        Ok(free.virtual_path().clone())
    }
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("store", &self.fs.name())
            .field("policy", &self.policy)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
