//! Local filesystem backend.
//!
//! Two flavours: [`LocalBackend::host`] addresses host paths as-is and is
//! the registry's default for unprefixed URIs; [`LocalBackend::rooted`]
//! confines every path to a root directory, blocking `..` escapes.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tokio::fs;

use crate::vfs::backend::{Backend, ContentReader, ContentWriter};
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::path::clean_path;
use crate::vfs::types::{DirEntry, FileType};

/// Prefix of the host filesystem backend.
pub const LOCAL_PREFIX: &str = "file://";

/// Local filesystem backend.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    prefix: String,
    root: Option<PathBuf>,
    read_only: bool,
}

impl LocalBackend {
    /// Host filesystem under `file://`; paths are used as given.
    pub fn host() -> Self {
        Self {
            prefix: LOCAL_PREFIX.to_string(),
            root: None,
            read_only: false,
        }
    }

    /// Filesystem confined to `root`, addressed under `prefix`.
    ///
    /// The root is canonicalized at construction time to handle symlinks
    /// (e.g. macOS `/tmp` → `/private/tmp`).
    pub fn rooted(prefix: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = dunce::canonicalize(&root).unwrap_or(root);
        Self {
            prefix: prefix.into(),
            root: Some(root),
            read_only: false,
        }
    }

    /// Set whether this filesystem is read-only (no writer capability).
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Map a backend path to a host path.
    fn resolve(&self, path: &str) -> VfsResult<PathBuf> {
        let Some(root) = &self.root else {
            return Ok(if path.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(path)
            });
        };

        // Paths are cleaned, so any remaining `..` is a climb above the root.
        let relative = path.trim_start_matches('/');
        if relative.split('/').any(|s| s == "..") {
            return Err(VfsError::path_escapes_root(path));
        }

        let full = if relative.is_empty() {
            root.clone()
        } else {
            root.join(relative)
        };

        // Symlinks inside the root may still point outside it.
        if let Ok(canonical) = dunce::canonicalize(&full) {
            if !canonical.starts_with(root) {
                return Err(VfsError::path_escapes_root(format!(
                    "{} is not under {}",
                    canonical.display(),
                    root.display()
                )));
            }
        }

        Ok(full)
    }

    fn map_io(err: io::Error, path: &str) -> VfsError {
        match err.kind() {
            io::ErrorKind::NotFound => VfsError::not_found(path),
            io::ErrorKind::PermissionDenied => VfsError::permission_denied(path),
            io::ErrorKind::NotADirectory => VfsError::not_a_directory(path),
            io::ErrorKind::IsADirectory => VfsError::is_a_directory(path),
            io::ErrorKind::DirectoryNotEmpty => VfsError::directory_not_empty(path),
            _ => VfsError::Io(err),
        }
    }

    fn kind_of(file_type: std::fs::FileType) -> FileType {
        if file_type.is_dir() {
            FileType::Directory
        } else if file_type.is_symlink() {
            FileType::Symlink
        } else {
            FileType::File
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn list(&self, path: &str, _name_patterns: &[&str]) -> VfsResult<Vec<DirEntry>> {
        let full_path = self.resolve(path)?;
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&full_path)
            .await
            .map_err(|e| Self::map_io(e, path))?;

        while let Some(entry) = dir.next_entry().await.map_err(|e| Self::map_io(e, path))? {
            let mut kind = Self::kind_of(entry.file_type().await.map_err(VfsError::from)?);
            if kind.is_symlink() {
                // Follow the link; a dangling one stays a symlink.
                if let Ok(meta) = fs::metadata(entry.path()).await {
                    kind = Self::kind_of(meta.file_type());
                }
            }

            // A lossy name would not resolve back to this entry.
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!(dir = %full_path.display(), name = ?raw, "skipping non-UTF-8 entry");
                    continue;
                }
            };
            entries.push(DirEntry { name, kind });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn stat(&self, path: &str) -> VfsResult<Option<FileType>> {
        let full_path = self.resolve(path)?;
        match fs::metadata(&full_path).await {
            Ok(meta) => Ok(Some(Self::kind_of(meta.file_type()))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            // A path component that is a file: the path cannot exist.
            Err(e) if e.kind() == io::ErrorKind::NotADirectory => Ok(None),
            Err(e) => Err(Self::map_io(e, path)),
        }
    }

    fn clean(&self, path: &str) -> String {
        match self.root {
            Some(_) => clean_path(&format!("/{path}")).trim_start_matches('/').to_string(),
            None => clean_path(path),
        }
    }

    fn reader(&self) -> Option<&dyn ContentReader> {
        Some(self)
    }

    fn writer(&self) -> Option<&dyn ContentWriter> {
        if self.read_only { None } else { Some(self) }
    }
}

#[async_trait]
impl ContentReader for LocalBackend {
    async fn read_all(&self, path: &str) -> VfsResult<Vec<u8>> {
        let full_path = self.resolve(path)?;
        fs::read(&full_path).await.map_err(|e| Self::map_io(e, path))
    }
}

#[async_trait]
impl ContentWriter for LocalBackend {
    async fn write_all(&self, path: &str, data: &[u8]) -> VfsResult<()> {
        if self.read_only {
            return Err(VfsError::ReadOnly(self.prefix.clone()));
        }
        let full_path = self.resolve(path)?;

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Self::map_io(e, path))?;
            }
        }

        fs::write(&full_path, data)
            .await
            .map_err(|e| Self::map_io(e, path))
    }

    async fn create_dir_all(&self, path: &str) -> VfsResult<()> {
        if self.read_only {
            return Err(VfsError::ReadOnly(self.prefix.clone()));
        }
        let full_path = self.resolve(path)?;
        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| Self::map_io(e, path))
    }

    async fn remove(&self, path: &str) -> VfsResult<()> {
        if self.read_only {
            return Err(VfsError::ReadOnly(self.prefix.clone()));
        }
        let full_path = self.resolve(path)?;
        if self.root.as_deref() == Some(full_path.as_path()) {
            return Err(VfsError::permission_denied("cannot remove root"));
        }

        let meta = fs::symlink_metadata(&full_path)
            .await
            .map_err(|e| Self::map_io(e, path))?;
        let result = if meta.is_dir() {
            fs::remove_dir(&full_path).await
        } else {
            fs::remove_file(&full_path).await
        };
        result.map_err(|e| Self::map_io(e, path))
    }
}
