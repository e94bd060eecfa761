/*!
 * VFS Permissions
 * Unix-style permission bits carried through stat, create and chmod
 */

use crate::core::limits::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// File permissions (Unix-style) with validation
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(deserialize_with = "deserialize_permission_mode")]
    pub mode: u32,
}

impl Permissions {
    /// Create permissions, masking to the valid bits
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            mode: mode & 0o7777,
        }
    }

    /// Default bits for new regular files (0o644)
    #[inline]
    #[must_use]
    pub const fn readwrite() -> Self {
        Self::new(DEFAULT_FILE_MODE)
    }

    /// Default bits for new directories (0o755)
    #[inline]
    #[must_use]
    pub const fn directory() -> Self {
        Self::new(DEFAULT_DIR_MODE)
    }

    /// Read-only bits (0o444)
    #[inline]
    #[must_use]
    pub const fn readonly() -> Self {
        Self::new(0o444)
    }

    /// No owner write bit
    #[inline(always)]
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.mode & 0o200 == 0
    }

    /// Set read-only mode by clearing all write bits
    pub fn set_readonly(&mut self, readonly: bool) {
        if readonly {
            self.mode &= !0o222;
        } else {
            self.mode |= 0o200;
        }
    }
}

impl fmt::Display for Permissions {
    /// Symbolic `rwxr-xr-x` form of the low nine bits
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const FLAGS: [char; 3] = ['r', 'w', 'x'];
        for shift in (0..9).rev() {
            let flag = FLAGS[2 - (shift % 3)];
            if self.mode & (1 << shift) != 0 {
                write!(f, "{}", flag)?;
            } else {
                write!(f, "-")?;
            }
        }
        Ok(())
    }
}

/// Deserialize and validate permission mode (must be <= 0o7777)
fn deserialize_permission_mode<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let mode = u32::deserialize(deserializer)?;
    if mode > 0o7777 {
        return Err(serde::de::Error::custom(format!(
            "invalid permission mode: 0o{:o} exceeds maximum 0o7777",
            mode
        )));
    }
    Ok(mode)
}

impl Default for Permissions {
    fn default() -> Self {
        Self::readwrite()
    }
}
