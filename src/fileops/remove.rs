/*!
 * Remove
 * Recursive delete that keeps going past failed children
 */

use tracing::{info, instrument, warn};

use super::walk::visit;
use super::FileOps;
use crate::errors::{AggregateError, FsError, FsResult};
use crate::sandbox::ResolvedPath;

impl FileOps<'_> {
    /// Delete a file, link or directory tree
    ///
    /// Links are removed, never followed. A directory is only removed once
    /// every child is gone; otherwise the failures come back as
    /// `FsError::Partial` and the directory stays.
    #[instrument(skip_all, fields(path = %path.virtual_path()))]
    pub fn remove_all(&self, path: &ResolvedPath) -> FsResult<()> {
        self.refuse_root(path, "delete")?;
        let result = self.remove_entry(path);
        match &result {
            Ok(()) => info!("entry deleted"),
            Err(FsError::Partial(agg)) => warn!(failures = agg.len(), "delete partially failed"),
            Err(e) => warn!(error = %e, "delete failed"),
        }
        result
    }

    fn remove_entry(&self, path: &ResolvedPath) -> FsResult<()> {
        let name = path.virtual_path().as_str();
        let metadata = self.lstat(path).map_err(|e| FsError::from_vfs(e, name))?;

        if metadata.is_dir() {
            let children = self
                .fs
                .read_dir(path.real_path())
                .map_err(|e| FsError::from_vfs(e, name))?;

            let mut failures = AggregateError::new();
            for child in children {
                let child_path = match path.child(&child.name) {
                    Ok(p) => p,
                    Err(e) => {
                        failures.push(format!("{}/{:?}", name, child.name), e);
                        continue;
                    }
                };

                visit(self.hook, child_path.virtual_path())?;

                if let Err(e) = self.remove_entry(&child_path) {
                    match e {
                        FsError::Interrupted(_) => return Err(e),
                        e => failures.push(child_path.virtual_path().as_str(), e),
                    }
                }
            }
            failures.into_result()?;
        }

        self.fs
            .remove(path.real_path())
            .map_err(|e| FsError::from_vfs(e, name))
    }
}
