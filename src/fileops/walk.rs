/*!
 * Walk Hooks
 * Checks interleaved before every child visit of a recursive walk
 */

use std::time::{Duration, Instant};

use crate::errors::{FsError, FsResult};
use crate::sandbox::VirtualPath;

/// Called before each child of a copy, delete or usage walk is visited
///
/// Returning an error stops the walk at once; the walk reports
/// `FsError::Interrupted` no matter which error the hook gave.
pub trait WalkHook {
    fn before_visit(&self, path: &VirtualPath) -> FsResult<()>;
}

/// Hook that never interrupts
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl WalkHook for NoHook {
    #[inline]
    fn before_visit(&self, _path: &VirtualPath) -> FsResult<()> {
        Ok(())
    }
}

/// Stops a walk once a point in time has passed
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

impl WalkHook for Deadline {
    fn before_visit(&self, path: &VirtualPath) -> FsResult<()> {
        if self.expired() {
            return Err(FsError::Interrupted(format!("deadline passed before {}", path)));
        }
        Ok(())
    }
}

impl<F> WalkHook for F
where
    F: Fn(&VirtualPath) -> FsResult<()>,
{
    fn before_visit(&self, path: &VirtualPath) -> FsResult<()> {
        self(path)
    }
}

/// Run `hook`, turning any refusal into `Interrupted`
pub(super) fn visit(hook: &dyn WalkHook, path: &VirtualPath) -> FsResult<()> {
    hook.before_visit(path).map_err(|e| match e {
        FsError::Interrupted(msg) => FsError::Interrupted(msg),
        other => FsError::Interrupted(format!("{}: {}", path, other)),
    })
}
