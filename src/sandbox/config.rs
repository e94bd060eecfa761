/*!
 * Sandbox Configuration
 * Engine tunables supplied by the host application
 */

use serde::{Deserialize, Serialize};

use crate::core::limits::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::errors::{FsError, FsResult};
use crate::listing::{SortKey, SortOrder};
use crate::permissions::RuleDefault;
use crate::vfs::Permissions;

/// Per-sandbox engine settings
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SandboxConfig {
    /// Sniff file headers when the extension gives no MIME type
    pub type_detection_by_header: bool,
    /// Deny paths whose final segment starts with `.`
    pub hide_dotfiles: bool,
    /// Decision for paths no rule of a tier matches
    pub unmatched: RuleDefault,
    pub default_sort: SortKey,
    pub default_order: SortOrder,
    /// Mode for directories created by mkdir, copy and move
    pub dir_mode: u32,
    /// Mode for files while a copy is in flight
    pub file_mode: u32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            type_detection_by_header: false,
            hide_dotfiles: false,
            unmatched: RuleDefault::Allow,
            default_sort: SortKey::Name,
            default_order: SortOrder::Asc,
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

impl SandboxConfig {
    /// Parse a JSON document
    pub fn from_json(json: &str) -> FsResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FsError::InvalidOption(format!("sandbox config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject modes with bits outside `0o7777`
    pub fn validate(&self) -> FsResult<()> {
        for (field, mode) in [("dir_mode", self.dir_mode), ("file_mode", self.file_mode)] {
            if mode & !0o7777 != 0 {
                return Err(FsError::InvalidOption(format!(
                    "{} {:o} has bits outside 0o7777",
                    field, mode
                )));
            }
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn dir_permissions(&self) -> Permissions {
        Permissions::new(self.dir_mode)
    }

    #[inline]
    #[must_use]
    pub fn file_permissions(&self) -> Permissions {
        Permissions::new(self.file_mode)
    }

    #[must_use]
    pub fn default_sorting(&self) -> (SortKey, SortOrder) {
        (self.default_sort, self.default_order)
    }
}
