//! The backend behind empty and unresolvable URIs.

use async_trait::async_trait;

use crate::vfs::backend::Backend;
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::types::{DirEntry, FileType};

/// Backend whose every operation fails with [`VfsError::InvalidBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidBackend;

#[async_trait]
impl Backend for InvalidBackend {
    fn prefix(&self) -> &str {
        ""
    }

    async fn list(&self, path: &str, _name_patterns: &[&str]) -> VfsResult<Vec<DirEntry>> {
        Err(VfsError::invalid_backend(path))
    }

    async fn stat(&self, path: &str) -> VfsResult<Option<FileType>> {
        Err(VfsError::invalid_backend(path))
    }

    fn join(&self, _base: &str, _segment: &str) -> String {
        String::new()
    }

    fn clean(&self, _path: &str) -> String {
        String::new()
    }

    fn is_invalid(&self) -> bool {
        true
    }
}
