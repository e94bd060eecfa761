/*!
 * Engine Limits and Constants
 *
 * Centralized location for thresholds and magic numbers used by the
 * classifier, listing builder and file operations.
 *
 * - Security-critical constants are marked with [SECURITY]
 * - Performance-critical constants are marked with [PERF]
 */

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Bytes sampled from the head of a file for sniffing and the text check
pub const SNIFF_LEN: usize = 512;

/// Largest file whose body may be inlined as text (10 MiB)
/// [SECURITY] Not negotiable by callers
pub const TEXT_INLINE_LIMIT: u64 = 10 * 1024 * 1024;

/// Highest code point treated as a binary control character
/// Covers NUL, EOF, backspace and friends; tab and newline sit above it
pub const MAX_CONTROL_CHAR: u32 = 8;

/// Tail window (bytes) in which an invalid UTF-8 sequence is blamed on a
/// read boundary cut rather than on binary content
pub const UTF8_TAIL_TOLERANCE: usize = 4;

/// Suffix of subtitle tracks detected next to video files
pub const SUBTITLE_SUFFIX: &str = ".vtt";

// =============================================================================
// LISTING
// =============================================================================

/// Offset added to directory sizes when sorting by size (-2^31)
/// Keeps directories ahead of files of comparable size without partitioning
pub const DIRECTORY_SIZE_OFFSET: i64 = i32::MIN as i64;

// =============================================================================
// FILE OPERATIONS
// =============================================================================

/// Streaming buffer for copies and checksums (64KB)
/// [PERF] Large enough to amortize syscalls
pub const IO_BUFFER_SIZE: usize = 64 * 1024;

/// Default permission bits for created directories
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Default permission bits for created files
pub const DEFAULT_FILE_MODE: u32 = 0o644;
