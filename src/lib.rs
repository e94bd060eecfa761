/*!
 * scopefs
 * Sandboxed filesystem and access-control engine for file-management backends
 *
 * Every request names an entry by a slash-rooted virtual path. The engine
 * confines it under a per-user sandbox root, checks it against the global and
 * per-user rule tiers, and only then reads or mutates the backing store.
 */

pub mod core;
pub mod errors;
pub mod fileops;
pub mod files;
pub mod listing;
pub mod permissions;
pub mod sandbox;
pub mod vfs;

// Re-exports
pub use errors::{AggregateError, ErrorKind, Failure, FsError, FsResult};
pub use fileops::{Deadline, FileOps, NoHook, Usage, WalkHook};
pub use files::{Algorithm, Category, ClassifyOptions, FileEntry};
pub use listing::{Listing, ListingRequest, MemoryPreferences, PreferenceStore, SortKey, SortOrder};
pub use permissions::{AccessPolicy, Checker, Rule, RuleDefault, RuleSet};
pub use sandbox::{InfoOptions, ResolvedPath, Sandbox, SandboxConfig, SandboxRoot, VirtualPath};
pub use vfs::{FileSystem, LocalFS, MemFS};
