//! Backend capability traits.
//!
//! The glob engine and walker only ever call the three required methods of
//! [`Backend`]: `list`, `stat` and `join`. Content access is an optional
//! capability that callers ask for with [`Backend::reader`] and
//! [`Backend::writer`].

use async_trait::async_trait;
use std::fmt;

use super::path::{clean_path, join_clean};
use super::types::{DirEntry, FileType};
use super::VfsResult;

/// A store addressed by a URI prefix such as `mem://`.
///
/// All paths handed to a backend are already cleaned and relative to the
/// backend: for `mem://a/b` the backend sees `a/b`.
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    /// The URI prefix this backend owns, including `://`.
    fn prefix(&self) -> &str;

    /// List the direct children of a directory.
    ///
    /// `name_patterns` is a pushdown hint: a backend may use it to skip
    /// entries whose names match none of the globs, but callers must not
    /// rely on it being applied, or applied correctly.
    async fn list(&self, path: &str, name_patterns: &[&str]) -> VfsResult<Vec<DirEntry>>;

    /// Fresh existence and type check. `Ok(None)` means "does not exist".
    async fn stat(&self, path: &str) -> VfsResult<Option<FileType>>;

    /// Join a segment onto a path, backend-style.
    fn join(&self, base: &str, segment: &str) -> String {
        join_clean(base, segment)
    }

    /// Clean a raw path for this backend.
    fn clean(&self, path: &str) -> String {
        clean_path(path)
    }

    /// Whole-file reads, if supported.
    fn reader(&self) -> Option<&dyn ContentReader> {
        None
    }

    /// Writes and removals, if supported.
    fn writer(&self) -> Option<&dyn ContentWriter> {
        None
    }

    /// True only for the distinguished invalid backend.
    fn is_invalid(&self) -> bool {
        false
    }
}

/// Optional capability: read whole files.
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Read the entire file at `path`.
    async fn read_all(&self, path: &str) -> VfsResult<Vec<u8>>;
}

/// Optional capability: create, overwrite and remove.
#[async_trait]
pub trait ContentWriter: Send + Sync {
    /// Create or truncate the file at `path` and write `data`.
    ///
    /// Missing parent directories are created.
    async fn write_all(&self, path: &str, data: &[u8]) -> VfsResult<()>;

    /// Create a directory and any missing parents. Existing directories are fine.
    async fn create_dir_all(&self, path: &str) -> VfsResult<()>;

    /// Remove a file or an empty directory.
    async fn remove(&self, path: &str) -> VfsResult<()>;
}
