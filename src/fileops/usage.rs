/*!
 * Disk Usage
 * Bounded-depth size and inode totals
 */

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::walk::visit;
use super::FileOps;
use crate::errors::{AggregateError, FsError, FsResult};
use crate::sandbox::ResolvedPath;

/// Totals for one subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Sum of entry sizes in bytes
    pub size: u64,
    /// Number of entries counted, the starting entry included
    pub inodes: u64,
}

impl Usage {
    fn add(&mut self, other: Usage) {
        self.size += other.size;
        self.inodes += other.inodes;
    }
}

impl FileOps<'_> {
    /// Sum sizes and entries under `path`, descending at most `max_depth` levels
    ///
    /// `max_depth == 0` counts only the entry itself. Links are counted, not
    /// followed. Children that fail are reported together once the walk ends.
    #[instrument(skip_all, fields(path = %path.virtual_path(), max_depth = max_depth))]
    pub fn disk_usage(&self, path: &ResolvedPath, max_depth: usize) -> FsResult<Usage> {
        let mut failures = AggregateError::new();
        let usage = self.usage_of(path, 0, max_depth, &mut failures)?;
        failures.into_result()?;
        debug!(size = usage.size, inodes = usage.inodes, "usage computed");
        Ok(usage)
    }

    fn usage_of(
        &self,
        path: &ResolvedPath,
        depth: usize,
        max_depth: usize,
        failures: &mut AggregateError,
    ) -> FsResult<Usage> {
        let name = path.virtual_path().as_str();
        let metadata = self.lstat(path).map_err(|e| FsError::from_vfs(e, name))?;

        let mut usage = Usage {
            size: metadata.size,
            inodes: 1,
        };

        if !metadata.is_dir() || depth >= max_depth {
            return Ok(usage);
        }

        let children = self
            .fs
            .read_dir(path.real_path())
            .map_err(|e| FsError::from_vfs(e, name))?;

        for child in children {
            let child_path = match path.child(&child.name) {
                Ok(p) => p,
                Err(e) => {
                    failures.push(format!("{}/{:?}", name, child.name), e);
                    continue;
                }
            };

            visit(self.hook, child_path.virtual_path())?;

            match self.usage_of(&child_path, depth + 1, max_depth, failures) {
                Ok(child_usage) => usage.add(child_usage),
                Err(e @ FsError::Interrupted(_)) => return Err(e),
                Err(e) => failures.push(child_path.virtual_path().as_str(), e),
            }
        }

        Ok(usage)
    }
}
