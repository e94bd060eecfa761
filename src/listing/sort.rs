/*!
 * Listing Sort
 * Sort keys, orders and the stable comparators behind them
 */

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::limits::DIRECTORY_SIZE_OFFSET;
use crate::files::FileEntry;

/// Field a listing is sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Time,
}

impl SortKey {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Size => "size",
            Self::Time => "time",
        }
    }

    /// Recognized key, or `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "size" => Some(Self::Size),
            "time" => Some(Self::Time),
            _ => None,
        }
    }

    /// Unrecognized keys fall back to `name`
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a sort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size key: directories shifted by -2^31 so they lead files of similar size
#[inline]
fn size_key(entry: &FileEntry) -> i64 {
    let size = i64::try_from(entry.size).unwrap_or(i64::MAX);
    if entry.is_dir {
        DIRECTORY_SIZE_OFFSET.saturating_add(size)
    } else {
        size
    }
}

/// Ascending comparison for `key`
///
/// - `name`: directories first, then case-insensitive name
/// - `size`: offset size, no partitioning
/// - `time`: modification time only
#[must_use]
pub fn compare(a: &FileEntry, b: &FileEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => b
            .is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::Size => size_key(a).cmp(&size_key(b)),
        SortKey::Time => a.modified.cmp(&b.modified),
    }
}

/// Stable in-place sort; `desc` reverses the comparator
pub fn sort_entries(items: &mut [FileEntry], key: SortKey, order: SortOrder) {
    items.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}
