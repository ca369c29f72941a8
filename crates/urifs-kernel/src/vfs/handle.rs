//! URI-addressed file handles.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use super::backend::Backend;
use super::backends::InvalidBackend;
use super::path::file_name;
use super::types::{DirEntry, FileType};
use super::VfsResult;

static INVALID: LazyLock<Handle> = LazyLock::new(|| Handle {
    backend: Arc::new(InvalidBackend),
    path: String::new(),
});

/// A backend plus a clean backend-relative path.
///
/// Handles are cheap to clone and compare by their URI (`prefix + path`),
/// so two handles built from different `Arc`s of equivalent backends under
/// the same prefix are equal.
#[derive(Clone)]
pub struct Handle {
    backend: Arc<dyn Backend>,
    path: String,
}

impl Handle {
    /// Create a handle, cleaning `path` the way the backend does.
    pub fn new(backend: Arc<dyn Backend>, path: &str) -> Self {
        let path = backend.clean(path);
        Self { backend, path }
    }

    /// The distinguished handle for empty or unresolvable URIs.
    ///
    /// Every backend operation on it fails with `VfsError::InvalidBackend`.
    pub fn invalid() -> Self {
        INVALID.clone()
    }

    pub fn is_invalid(&self) -> bool {
        self.backend.is_invalid()
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Backend-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical string form: `prefix + path`, with a `/` between them
    /// when the prefix does not end in one.
    pub fn uri(&self) -> String {
        self.to_string()
    }

    /// Last path segment, `""` at a backend root.
    pub fn name(&self) -> &str {
        file_name(&self.path)
    }

    /// Child handle on the same backend.
    pub fn join(&self, segment: &str) -> Handle {
        Handle {
            backend: Arc::clone(&self.backend),
            path: self.backend.join(&self.path, segment),
        }
    }

    /// Fresh existence/type check.
    pub async fn stat(&self) -> VfsResult<Option<FileType>> {
        self.backend.stat(&self.path).await
    }

    /// Returns true if the handle currently names a directory.
    pub async fn is_dir(&self) -> VfsResult<bool> {
        Ok(self.stat().await?.is_some_and(|kind| kind.is_dir()))
    }

    /// One-level listing with no pushdown hint.
    pub async fn list(&self) -> VfsResult<Vec<DirEntry>> {
        self.backend.list(&self.path, &[]).await
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.backend.prefix();
        let bare = prefix.is_empty() || prefix.ends_with('/');
        let sep = if bare || self.path.is_empty() || self.path.starts_with('/') {
            ""
        } else {
            "/"
        };
        write!(f, "{prefix}{sep}{}", self.path)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.uri()).finish()
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.backend.prefix() == other.backend.prefix() && self.path == other.path
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri().hash(state);
    }
}

impl PartialOrd for Handle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Handle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uri().cmp(&other.uri())
    }
}
