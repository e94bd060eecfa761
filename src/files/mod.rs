/*!
 * Files Module
 * Entry description, content classification and checksums
 */

pub mod checksum;
pub mod classify;
pub mod entry;
pub mod mime;
pub mod text;

pub use checksum::{checksum, Algorithm};
pub use classify::{classify, ClassifyOptions};
pub use entry::{Category, FileEntry};
pub use text::is_binary;
