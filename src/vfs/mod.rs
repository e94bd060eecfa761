/*!
 * Virtual File System Module
 * Pluggable store abstraction the engine runs against
 */

pub mod local;
pub mod memory;
pub mod traits;
pub mod types;

// Re-exports
pub use local::LocalFS;
pub use memory::MemFS;
pub use traits::{FileSystem, OpenFile};
pub use types::{Entry, FileType, Metadata, Permissions, VfsError, VfsResult};
