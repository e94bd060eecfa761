/*!
 * File Classifier
 * Resolves links and assigns a content category to one entry
 */

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entry::{extension, Category, FileEntry};
use super::{mime, text};
use crate::core::limits::{SNIFF_LEN, SUBTITLE_SUFFIX, TEXT_INLINE_LIMIT};
use crate::errors::{FsError, FsResult};
use crate::sandbox::{ResolvedPath, SandboxRoot};
use crate::vfs::{FileSystem, Metadata, VfsResult};

/// What the classifier should do beyond stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyOptions {
    /// Assign a category to regular files
    pub detect_content: bool,
    /// Text files are editable (`text`) rather than `textImmutable`
    pub modifiable: bool,
    /// Sniff the header when the extension gives no MIME type
    pub read_header: bool,
    /// Attach the body of text files
    pub content: bool,
}

/// Stat `path` without following a final link when the store can
fn lstat(fs: &dyn FileSystem, path: &Path) -> VfsResult<Metadata> {
    match fs.lstat_if_supported(path) {
        Some(result) => result,
        None => fs.stat(path),
    }
}

/// Describe and classify one entry
///
/// Directories are never expanded. A dangling link is reported with its own
/// metadata and category `invalid_link`.
pub fn classify(
    fs: &dyn FileSystem,
    root: &SandboxRoot,
    path: &ResolvedPath,
    opts: ClassifyOptions,
) -> FsResult<FileEntry> {
    let virtual_path = path.virtual_path().as_str();
    let metadata =
        lstat(fs, path.real_path()).map_err(|e| FsError::from_vfs(e, virtual_path))?;

    let mut entry = FileEntry::new(path, &metadata);

    if metadata.is_symlink() {
        match fs.stat(path.real_path()) {
            Ok(target) => {
                entry.apply_metadata(&target);
                entry.link_target = link_target(fs, root, path);
            }
            Err(e) => {
                debug!(path = %virtual_path, error = %e, "dangling symlink");
                entry.category = Some(Category::InvalidLink);
                return Ok(entry);
            }
        }
    }

    if entry.is_dir || !opts.detect_content {
        return Ok(entry);
    }

    detect_type(fs, path, &mut entry, opts)?;
    Ok(entry)
}

/// Best-effort link target that never exposes the sandbox root
fn link_target(fs: &dyn FileSystem, root: &SandboxRoot, path: &ResolvedPath) -> Option<String> {
    let target = fs.readlink_if_supported(path.real_path())?.ok()?;
    if target.is_absolute() {
        root.virtualize(&target).map(|v| v.to_string())
    } else {
        target.to_str().map(str::to_string)
    }
}

fn detect_type(
    fs: &dyn FileSystem,
    path: &ResolvedPath,
    entry: &mut FileEntry,
    opts: ClassifyOptions,
) -> FsResult<()> {
    if entry.file_type.is_special() {
        entry.category = Some(Category::Blob);
        return Ok(());
    }

    let mut header: Option<Vec<u8>> = None;
    let mut mime_type = mime::from_extension(&entry.extension).unwrap_or("");
    if mime_type.is_empty() && opts.read_header {
        let sample = read_header(fs, path)?;
        mime_type = mime::sniff(&sample);
        header = Some(sample);
    }

    if let Some(category) = Category::from_mime(mime_type) {
        if category == Category::Video {
            entry.subtitles = detect_subtitles(fs, path);
        }
        entry.category = Some(category);
        return Ok(());
    }

    let header = match header {
        Some(sample) => sample,
        None => read_header(fs, path)?,
    };

    if text::is_binary(&header) || entry.size > TEXT_INLINE_LIMIT {
        entry.category = Some(Category::Blob);
        return Ok(());
    }

    entry.category = Some(if opts.modifiable {
        Category::Text
    } else {
        Category::TextImmutable
    });

    if opts.content {
        entry.content = Some(read_body(fs, path)?);
    }
    Ok(())
}

/// First `SNIFF_LEN` bytes (fewer for short files)
fn read_header(fs: &dyn FileSystem, path: &ResolvedPath) -> FsResult<Vec<u8>> {
    let virtual_path = path.virtual_path().as_str();
    let file = fs
        .open(path.real_path())
        .map_err(|e| FsError::from_vfs(e, virtual_path))?;

    let mut sample = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut sample)
        .map_err(|e| FsError::io(&e, virtual_path))?;
    Ok(sample)
}

fn read_body(fs: &dyn FileSystem, path: &ResolvedPath) -> FsResult<String> {
    let virtual_path = path.virtual_path().as_str();
    let mut file = fs
        .open(path.real_path())
        .map_err(|e| FsError::from_vfs(e, virtual_path))?;

    let mut body = Vec::new();
    file.read_to_end(&mut body)
        .map_err(|e| FsError::io(&e, virtual_path))?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Sibling `.vtt` files whose names start with the video's base name
fn detect_subtitles(fs: &dyn FileSystem, path: &ResolvedPath) -> Vec<String> {
    let name = path.name();
    let base = &name[..name.len() - extension(name).len()];
    let parent = path.parent();

    let siblings = match fs.read_dir(parent.real_path()) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %parent.virtual_path(), error = %e, "subtitle scan skipped");
            return Vec::new();
        }
    };

    let mut subtitles: Vec<String> = siblings
        .into_iter()
        .filter(|sibling| {
            !sibling.is_dir()
                && sibling.name.starts_with(base)
                && sibling.name.ends_with(SUBTITLE_SUFFIX)
        })
        .filter_map(|sibling| {
            parent
                .virtual_path()
                .join(&sibling.name)
                .ok()
                .map(|v| v.to_string())
        })
        .collect();
    subtitles.sort();
    subtitles
}
