/*!
 * Local Filesystem Backend
 * Wraps std::fs for host filesystem access
 */

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::traits::{FileSystem, OpenFile};
use super::types::*;

/// Host filesystem store using std::fs
///
/// Paths are host paths produced by the sandbox resolver; this backend does
/// no confinement of its own.
#[derive(Debug, Clone, Default)]
pub struct LocalFS {
    readonly: bool,
}

impl LocalFS {
    /// Create a writable host store
    pub fn new() -> Self {
        Self { readonly: false }
    }

    /// Create a read-only host store
    pub fn readonly() -> Self {
        Self { readonly: true }
    }

    /// Check write permission
    fn check_write(&self) -> VfsResult<()> {
        if self.readonly {
            return Err(VfsError::ReadOnly);
        }
        Ok(())
    }

    /// Convert std::fs::FileType to VFS FileType
    fn convert_file_type(ft: fs::FileType) -> FileType {
        if ft.is_symlink() {
            return FileType::Symlink;
        }
        if ft.is_dir() {
            return FileType::Directory;
        }
        if ft.is_file() {
            return FileType::File;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_fifo() {
                return FileType::Fifo;
            }
            if ft.is_socket() {
                return FileType::Socket;
            }
            if ft.is_block_device() {
                return FileType::BlockDevice;
            }
            if ft.is_char_device() {
                return FileType::CharDevice;
            }
        }

        FileType::Unknown
    }

    /// Convert std::fs::Metadata to VFS Metadata
    fn convert_metadata(md: fs::Metadata) -> Metadata {
        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            md.permissions().mode()
        };
        #[cfg(not(unix))]
        let mode = if md.permissions().readonly() {
            0o444
        } else {
            0o644
        };

        Metadata {
            file_type: Self::convert_file_type(md.file_type()),
            size: md.len(),
            permissions: Permissions::new(mode),
            modified: md.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }

    #[cfg(unix)]
    fn apply_permissions(path: &Path, perms: Permissions) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(perms.mode))
    }

    #[cfg(not(unix))]
    fn apply_permissions(path: &Path, perms: Permissions) -> std::io::Result<()> {
        let mut std_perms = fs::metadata(path)?.permissions();
        std_perms.set_readonly(perms.is_readonly());
        fs::set_permissions(path, std_perms)
    }
}

impl FileSystem for LocalFS {
    fn stat(&self, path: &Path) -> VfsResult<Metadata> {
        let md = fs::metadata(path)
            .map_err(|e| VfsError::from_io(e, format!("stat {}", path.display())))?;
        Ok(Self::convert_metadata(md))
    }

    fn lstat_if_supported(&self, path: &Path) -> Option<VfsResult<Metadata>> {
        Some(
            fs::symlink_metadata(path)
                .map(Self::convert_metadata)
                .map_err(|e| VfsError::from_io(e, format!("lstat {}", path.display()))),
        )
    }

    fn open(&self, path: &Path) -> VfsResult<Box<dyn OpenFile>> {
        let file = fs::File::open(path)
            .map_err(|e| VfsError::from_io(e, format!("open {}", path.display())))?;
        Ok(Box::new(LocalFile { file }))
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<Entry>> {
        let entries = fs::read_dir(path)
            .map_err(|e| VfsError::from_io(e, format!("read_dir {}", path.display())))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                VfsError::from_io(e, format!("read dir entry in {}", path.display()))
            })?;
            let name = entry.file_name().into_string().map_err(|raw| {
                VfsError::InvalidPath(format!(
                    "invalid UTF-8 in filename {:?} under {}",
                    raw,
                    path.display()
                ))
            })?;
            let file_type = entry
                .file_type()
                .map_err(|e| VfsError::from_io(e, format!("get file type for {}", name)))?;

            result.push(Entry::new_unchecked(
                name,
                Self::convert_file_type(file_type),
            ));
        }

        Ok(result)
    }

    fn mkdir_all(&self, path: &Path, perms: Permissions) -> VfsResult<()> {
        self.check_write()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            fs::DirBuilder::new()
                .recursive(true)
                .mode(perms.mode)
                .create(path)
                .map_err(|e| VfsError::from_io(e, format!("mkdir_all {}", path.display())))
        }

        #[cfg(not(unix))]
        {
            let _ = perms;
            fs::create_dir_all(path)
                .map_err(|e| VfsError::from_io(e, format!("mkdir_all {}", path.display())))
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        self.check_write()?;
        fs::rename(from, to).map_err(|e| {
            VfsError::from_io(e, format!("rename {} to {}", from.display(), to.display()))
        })
    }

    fn remove(&self, path: &Path) -> VfsResult<()> {
        self.check_write()?;
        let md = fs::symlink_metadata(path)
            .map_err(|e| VfsError::from_io(e, format!("remove {}", path.display())))?;

        if md.is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        }
        .map_err(|e| VfsError::from_io(e, format!("remove {}", path.display())))
    }

    fn remove_all(&self, path: &Path) -> VfsResult<()> {
        self.check_write()?;
        let md = fs::symlink_metadata(path)
            .map_err(|e| VfsError::from_io(e, format!("remove_all {}", path.display())))?;

        if md.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
        .map_err(|e| VfsError::from_io(e, format!("remove_all {}", path.display())))
    }

    fn create(&self, path: &Path, perms: Permissions) -> VfsResult<Box<dyn OpenFile>> {
        self.check_write()?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(perms.mode);
        }
        #[cfg(not(unix))]
        let _ = perms;

        let file = options
            .open(path)
            .map_err(|e| VfsError::from_io(e, format!("create {}", path.display())))?;
        Ok(Box::new(LocalFile { file }))
    }

    fn chmod(&self, path: &Path, perms: Permissions) -> VfsResult<()> {
        self.check_write()?;
        Self::apply_permissions(path, perms)
            .map_err(|e| VfsError::from_io(e, format!("chmod {}", path.display())))
    }

    fn readlink_if_supported(&self, path: &Path) -> Option<VfsResult<PathBuf>> {
        Some(
            fs::read_link(path)
                .map_err(|e| VfsError::from_io(e, format!("readlink {}", path.display()))),
        )
    }

    fn symlink_if_supported(&self, target: &Path, link: &Path) -> Option<VfsResult<()>> {
        if let Err(e) = self.check_write() {
            return Some(Err(e));
        }

        #[cfg(unix)]
        {
            Some(std::os::unix::fs::symlink(target, link).map_err(|e| {
                VfsError::from_io(
                    e,
                    format!("symlink {} to {}", link.display(), target.display()),
                )
            }))
        }

        #[cfg(windows)]
        {
            // Windows needs to know whether the target is a directory
            let result = if target.is_dir() {
                std::os::windows::fs::symlink_dir(target, link)
            } else {
                std::os::windows::fs::symlink_file(target, link)
            };
            Some(result.map_err(|e| {
                VfsError::from_io(
                    e,
                    format!("symlink {} to {}", link.display(), target.display()),
                )
            }))
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = (target, link);
            None
        }
    }

    fn name(&self) -> &str {
        "local"
    }

    fn readonly(&self) -> bool {
        self.readonly
    }
}

/// Local file handle
struct LocalFile {
    file: fs::File,
}

impl Read for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for LocalFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl OpenFile for LocalFile {
    fn sync(&mut self) -> VfsResult<()> {
        self.file
            .sync_all()
            .map_err(|e| VfsError::IoError(format!("sync: {}", e)))
    }
}
