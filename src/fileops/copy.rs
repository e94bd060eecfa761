/*!
 * Copy
 * Recursive, best-effort copies of files, directories and links
 */

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::walk::visit;
use super::FileOps;
use crate::errors::{AggregateError, FsError, FsResult};
use crate::sandbox::ResolvedPath;
use crate::vfs::Metadata;

impl FileOps<'_> {
    /// Copy a file, link or directory tree
    ///
    /// Directory copies keep going past failed children and end with
    /// `FsError::Partial` listing each one.
    #[instrument(skip_all, fields(src = %src.virtual_path(), dst = %dst.virtual_path()))]
    pub fn copy(&self, src: &ResolvedPath, dst: &ResolvedPath) -> FsResult<()> {
        self.check_pair(src, dst, "copy")?;
        let result = self.copy_entry(src, dst);
        match &result {
            Ok(()) => info!("copy finished"),
            Err(FsError::Partial(agg)) => warn!(failures = agg.len(), "copy partially failed"),
            Err(e) => warn!(error = %e, "copy failed"),
        }
        result
    }

    fn copy_entry(&self, src: &ResolvedPath, dst: &ResolvedPath) -> FsResult<()> {
        let metadata = self
            .lstat(src)
            .map_err(|e| FsError::from_vfs(e, src.virtual_path().as_str()))?;

        if metadata.is_symlink() {
            self.copy_symlink(src, dst)
        } else if metadata.is_dir() {
            self.copy_dir(src, dst, &metadata)
        } else {
            self.copy_file(src, dst, &metadata)
        }
    }

    fn copy_dir(&self, src: &ResolvedPath, dst: &ResolvedPath, metadata: &Metadata) -> FsResult<()> {
        self.fs
            .mkdir_all(dst.real_path(), metadata.permissions)
            .map_err(|e| FsError::from_vfs(e, dst.virtual_path().as_str()))?;

        let children = self
            .fs
            .read_dir(src.real_path())
            .map_err(|e| FsError::from_vfs(e, src.virtual_path().as_str()))?;

        let mut failures = AggregateError::new();
        for child in children {
            let (child_src, child_dst) = match (src.child(&child.name), dst.child(&child.name)) {
                (Ok(s), Ok(d)) => (s, d),
                (Err(e), _) | (_, Err(e)) => {
                    failures.push(format!("{}/{:?}", src.virtual_path(), child.name), e);
                    continue;
                }
            };

            visit(self.hook, child_src.virtual_path())?;

            if let Err(e) = self.copy_entry(&child_src, &child_dst) {
                match e {
                    FsError::Interrupted(_) => return Err(e),
                    e => failures.push(child_src.virtual_path().as_str(), e),
                }
            }
        }

        failures.into_result()
    }

    fn copy_file(&self, src: &ResolvedPath, dst: &ResolvedPath, metadata: &Metadata) -> FsResult<()> {
        let src_name = src.virtual_path().as_str();
        let dst_name = dst.virtual_path().as_str();

        let mut reader = self
            .fs
            .open(src.real_path())
            .map_err(|e| FsError::from_vfs(e, src_name))?;

        let parent = dst.parent();
        self.fs
            .mkdir_all(parent.real_path(), self.dir_mode)
            .map_err(|e| FsError::from_vfs(e, parent.virtual_path().as_str()))?;

        let mut writer = self
            .fs
            .create(dst.real_path(), self.file_mode)
            .map_err(|e| FsError::from_vfs(e, dst_name))?;

        let copied =
            std::io::copy(&mut reader, &mut writer).map_err(|e| FsError::io(&e, dst_name))?;
        writer.sync().map_err(|e| FsError::from_vfs(e, dst_name))?;
        drop(writer);

        self.fs
            .chmod(dst.real_path(), metadata.permissions)
            .map_err(|e| FsError::from_vfs(e, dst_name))?;

        debug!(src = %src_name, dst = %dst_name, bytes = copied, "file copied");
        Ok(())
    }

    /// Recreate a link at `dst`
    ///
    /// Relative targets that stay inside the root are kept verbatim. Absolute
    /// targets are cleaned and kept when inside the root. Anything else is
    /// re-rooted under the sandbox.
    fn copy_symlink(&self, src: &ResolvedPath, dst: &ResolvedPath) -> FsResult<()> {
        let src_name = src.virtual_path().as_str();
        let dst_name = dst.virtual_path().as_str();

        let target = match self.fs.readlink_if_supported(src.real_path()) {
            Some(result) => result.map_err(|e| FsError::from_vfs(e, src_name))?,
            None => {
                return Err(FsError::Io(format!(
                    "{}: store cannot read links",
                    src_name
                )))
            }
        };

        let parent = dst.parent();
        let target = self.confine_link_target(&target, parent.real_path());

        self.fs
            .mkdir_all(parent.real_path(), self.dir_mode)
            .map_err(|e| FsError::from_vfs(e, parent.virtual_path().as_str()))?;

        match self.fs.symlink_if_supported(&target, dst.real_path()) {
            Some(result) => result.map_err(|e| FsError::from_vfs(e, dst_name)),
            None => Err(FsError::Io(format!("{}: store cannot create links", dst_name))),
        }
    }

    /// Target for a link created in `link_dir` that never leaves the root
    pub(crate) fn confine_link_target(&self, target: &Path, link_dir: &Path) -> PathBuf {
        let root = self.root.as_path();
        if target.is_relative() {
            let landing = path_clean::clean(link_dir.join(target));
            if landing.starts_with(root) {
                return target.to_path_buf();
            }
            return self.reroot(&landing);
        }

        let cleaned = path_clean::clean(target);
        if cleaned.starts_with(root) {
            return cleaned;
        }
        self.reroot(&cleaned)
    }

    /// Graft a cleaned absolute path onto the root
    fn reroot(&self, cleaned: &Path) -> PathBuf {
        let mut rerooted = self.root.as_path().to_path_buf();
        for component in cleaned.components() {
            if let Component::Normal(part) = component {
                rerooted.push(part);
            }
        }
        rerooted
    }
}
