/*!
 * File Entry
 * Per-request description of one file, directory or link
 */

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::core::serde::{is_empty_vec, is_false, system_time_micros};
use crate::sandbox::{ResolvedPath, VirtualPath};
use crate::vfs::{FileType, Metadata, Permissions};

/// Coarse content kind of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "pdf")]
    Pdf,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "textImmutable")]
    TextImmutable,
    #[serde(rename = "blob")]
    Blob,
    #[serde(rename = "invalid_link")]
    InvalidLink,
}

impl Category {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::TextImmutable => "textImmutable",
            Self::Blob => "blob",
            Self::InvalidLink => "invalid_link",
        }
    }

    /// Category implied by a MIME type, if any
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("video/") {
            Some(Self::Video)
        } else if mime.starts_with("audio/") {
            Some(Self::Audio)
        } else if mime.starts_with("image/") {
            Some(Self::Image)
        } else if mime
            .split(';')
            .next()
            .is_some_and(|essence| essence.trim().ends_with("/pdf"))
        {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text | Self::TextImmutable)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension of `name` including the dot, empty when there is none
#[must_use]
pub fn extension(name: &str) -> &str {
    name.rfind('.').map_or("", |i| &name[i..])
}

/// Description of one entry, built fresh for every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: VirtualPath,
    pub name: String,
    pub size: u64,
    #[serde(with = "system_time_micros")]
    pub modified: SystemTime,
    pub mode: Permissions,
    pub file_type: FileType,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub is_symlink: bool,
    /// Best-effort link target; relative targets verbatim, absolute ones as virtual paths
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub link_target: Option<String>,
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "is_empty_vec", default)]
    pub subtitles: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub checksums: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,
}

impl FileEntry {
    /// Entry for `path` described by `metadata`, nothing classified yet
    pub fn new(path: &ResolvedPath, metadata: &Metadata) -> Self {
        let name = path.name().to_string();
        let extension = if path.virtual_path().is_root() {
            String::new()
        } else {
            extension(&name).to_string()
        };

        let mut entry = Self {
            path: path.virtual_path().clone(),
            name,
            size: 0,
            modified: SystemTime::UNIX_EPOCH,
            mode: metadata.permissions,
            file_type: metadata.file_type,
            is_dir: false,
            is_symlink: metadata.is_symlink(),
            link_target: None,
            extension,
            category: None,
            subtitles: Vec::new(),
            checksums: BTreeMap::new(),
            content: None,
        };
        entry.apply_metadata(metadata);
        entry
    }

    /// Take size, time, mode and type from `metadata` (a link's target, say)
    ///
    /// `is_symlink` is left alone so a followed link still reports as a link.
    pub fn apply_metadata(&mut self, metadata: &Metadata) {
        self.size = metadata.size;
        self.modified = metadata.modified;
        self.mode = metadata.permissions;
        self.file_type = metadata.file_type;
        self.is_dir = metadata.is_dir();
    }

    /// Path for display: directories get a trailing `/`
    #[must_use]
    pub fn display_path(&self) -> String {
        if self.is_dir && !self.path.is_root() {
            format!("{}/", self.path)
        } else {
            self.path.to_string()
        }
    }

    #[inline]
    #[must_use]
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }
}
