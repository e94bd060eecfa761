/*!
 * Checksums
 * Streaming md5/sha1/sha256/sha512 digests of sandboxed files
 */

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::core::limits::IO_BUFFER_SIZE;
use crate::errors::{FsError, FsResult};
use crate::sandbox::ResolvedPath;
use crate::vfs::FileSystem;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// Name used as the key in `FileEntry::checksums`
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Lower-case hex digest of everything `reader` yields
    pub fn hex_digest(&self, reader: &mut dyn Read) -> std::io::Result<String> {
        match self {
            Self::Md5 => stream::<Md5>(reader),
            Self::Sha1 => stream::<Sha1>(reader),
            Self::Sha256 => stream::<Sha256>(reader),
            Self::Sha512 => stream::<Sha512>(reader),
        }
    }
}

impl FromStr for Algorithm {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(FsError::InvalidOption(format!(
                "unsupported checksum algorithm {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn stream<D: Digest>(reader: &mut dyn Read) -> std::io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; IO_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Checksum a file without buffering it
///
/// Fails with `IsDirectory` for directories.
pub fn checksum(fs: &dyn FileSystem, path: &ResolvedPath, algo: Algorithm) -> FsResult<String> {
    let virtual_path = path.virtual_path().as_str();

    let metadata = fs
        .stat(path.real_path())
        .map_err(|e| FsError::from_vfs(e, virtual_path))?;
    if metadata.is_dir() {
        return Err(FsError::IsDirectory(virtual_path.to_string()));
    }

    let mut file = fs
        .open(path.real_path())
        .map_err(|e| FsError::from_vfs(e, virtual_path))?;
    algo.hex_digest(&mut file)
        .map_err(|e| FsError::io(&e, virtual_path))
}
