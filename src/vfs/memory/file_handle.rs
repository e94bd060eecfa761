/*!
 * File Handle Implementation
 * In-memory file handles for reading and writing
 */

use std::io::{Cursor, Read, Write};
use std::path::PathBuf;

use super::super::traits::OpenFile;
use super::super::types::*;
use super::MemFS;

enum Mode {
    Read(Cursor<Vec<u8>>),
    Write { buffer: Vec<u8>, perms: Permissions },
}

/// In-memory file handle
///
/// Readers work on a snapshot taken at open time. Writers buffer and publish
/// their contents on `sync` (and on drop).
pub(super) struct MemFile {
    fs: MemFS,
    path: PathBuf,
    mode: Mode,
}

impl MemFile {
    pub fn reader(fs: MemFS, path: PathBuf, cursor: Cursor<Vec<u8>>) -> Self {
        Self {
            fs,
            path,
            mode: Mode::Read(cursor),
        }
    }

    pub fn writer(fs: MemFS, path: PathBuf, perms: Permissions) -> Self {
        Self {
            fs,
            path,
            mode: Mode::Write {
                buffer: Vec::new(),
                perms,
            },
        }
    }
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.mode {
            Mode::Read(cursor) => cursor.read(buf),
            Mode::Write { .. } => Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "file not opened for reading",
            )),
        }
    }
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.mode {
            Mode::Write { buffer, .. } => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            Mode::Read(_) => Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "file not opened for writing",
            )),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.sync()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    }
}

impl OpenFile for MemFile {
    fn sync(&mut self) -> VfsResult<()> {
        if let Mode::Write { buffer, perms } = &self.mode {
            self.fs
                .store_file(&self.path, buffer.clone(), *perms, false)?;
        }
        Ok(())
    }
}

impl Drop for MemFile {
    fn drop(&mut self) {
        // Auto-sync on drop if opened for writing
        let _ = self.sync();
    }
}
