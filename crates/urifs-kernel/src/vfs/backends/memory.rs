//! In-memory filesystem backend.
//!
//! Used for `mem://` scratch space and testing. All data is ephemeral.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use urifs_glob::Matcher;

use crate::vfs::backend::{Backend, ContentReader, ContentWriter};
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::path::clean_path;
use crate::vfs::types::{DirEntry, FileType};

/// Default prefix for in-memory backends.
pub const MEMORY_PREFIX: &str = "mem://";

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File { data: Vec<u8> },
    Directory,
}

impl Entry {
    fn kind(&self) -> FileType {
        match self {
            Entry::File { .. } => FileType::File,
            Entry::Directory => FileType::Directory,
        }
    }
}

/// In-memory filesystem backend.
///
/// Thread-safe via internal `RwLock`. All data is lost when dropped.
/// Paths are stored without a leading `/`; the root is `""`.
#[derive(Debug)]
pub struct MemoryBackend {
    prefix: String,
    entries: RwLock<HashMap<String, Entry>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create a new empty in-memory filesystem under `mem://`.
    pub fn new() -> Self {
        Self::with_prefix(MEMORY_PREFIX)
    }

    /// Create a new empty in-memory filesystem under a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        // Root directory always exists
        entries.insert(String::new(), Entry::Directory);
        Self {
            prefix: prefix.into(),
            entries: RwLock::new(entries),
        }
    }

    /// Normalize a path: drop the leading `/`, never climb above the root.
    fn normalize(path: &str) -> String {
        let cleaned = clean_path(&format!("/{path}"));
        cleaned.trim_start_matches('/').to_string()
    }

    fn parent_of(path: &str) -> Option<&str> {
        if path.is_empty() {
            return None;
        }
        Some(path.rsplit_once('/').map_or("", |(parent, _)| parent))
    }

    fn name_of(path: &str) -> &str {
        path.rsplit_once('/').map_or(path, |(_, name)| name)
    }

    /// Ensure all parent directories of `path` exist.
    fn ensure_parents(entries: &mut HashMap<String, Entry>, path: &str) -> VfsResult<()> {
        let mut current = Self::parent_of(path);
        let mut missing = Vec::new();
        while let Some(dir) = current {
            match entries.get(dir) {
                Some(Entry::Directory) => break,
                Some(Entry::File { .. }) => return Err(VfsError::not_a_directory(dir)),
                None => missing.push(dir.to_string()),
            }
            current = Self::parent_of(dir);
        }
        for dir in missing {
            entries.insert(dir, Entry::Directory);
        }
        Ok(())
    }

    /// Compile the pushdown hint; an unusable hint means "no filtering".
    fn pushdown(name_patterns: &[&str]) -> Option<Vec<Matcher>> {
        if name_patterns.is_empty() {
            return None;
        }
        name_patterns
            .iter()
            .map(|p| Matcher::new(p).ok())
            .collect()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn list(&self, path: &str, name_patterns: &[&str]) -> VfsResult<Vec<DirEntry>> {
        let normalized = Self::normalize(path);
        let entries = self
            .entries
            .read()
            .map_err(|_| VfsError::other("lock poisoned"))?;

        // Verify the path is a directory
        match entries.get(&normalized) {
            Some(Entry::Directory) => {}
            Some(_) => return Err(VfsError::not_a_directory(normalized)),
            None => return Err(VfsError::not_found(normalized)),
        }

        let filters = Self::pushdown(name_patterns);

        let mut result: Vec<DirEntry> = entries
            .iter()
            .filter(|(entry_path, _)| Self::parent_of(entry_path) == Some(normalized.as_str()))
            .map(|(entry_path, entry)| DirEntry::new(Self::name_of(entry_path), entry.kind()))
            .filter(|entry| match &filters {
                Some(filters) => filters.iter().any(|m| m.matches(&entry.name)),
                None => true,
            })
            .collect();

        // Sort for consistent ordering
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn stat(&self, path: &str) -> VfsResult<Option<FileType>> {
        let normalized = Self::normalize(path);
        let entries = self
            .entries
            .read()
            .map_err(|_| VfsError::other("lock poisoned"))?;
        Ok(entries.get(&normalized).map(Entry::kind))
    }

    fn clean(&self, path: &str) -> String {
        Self::normalize(path)
    }

    fn reader(&self) -> Option<&dyn ContentReader> {
        Some(self)
    }

    fn writer(&self) -> Option<&dyn ContentWriter> {
        Some(self)
    }
}

#[async_trait]
impl ContentReader for MemoryBackend {
    async fn read_all(&self, path: &str) -> VfsResult<Vec<u8>> {
        let normalized = Self::normalize(path);
        let entries = self
            .entries
            .read()
            .map_err(|_| VfsError::other("lock poisoned"))?;

        match entries.get(&normalized) {
            Some(Entry::File { data }) => Ok(data.clone()),
            Some(Entry::Directory) => Err(VfsError::is_a_directory(normalized)),
            None => Err(VfsError::not_found(normalized)),
        }
    }
}

#[async_trait]
impl ContentWriter for MemoryBackend {
    async fn write_all(&self, path: &str, data: &[u8]) -> VfsResult<()> {
        let normalized = Self::normalize(path);
        let mut entries = self
            .entries
            .write()
            .map_err(|_| VfsError::other("lock poisoned"))?;

        if let Some(Entry::Directory) = entries.get(&normalized) {
            return Err(VfsError::is_a_directory(normalized));
        }

        Self::ensure_parents(&mut entries, &normalized)?;
        entries.insert(
            normalized,
            Entry::File {
                data: data.to_vec(),
            },
        );
        Ok(())
    }

    async fn create_dir_all(&self, path: &str) -> VfsResult<()> {
        let normalized = Self::normalize(path);
        let mut entries = self
            .entries
            .write()
            .map_err(|_| VfsError::other("lock poisoned"))?;

        match entries.get(&normalized) {
            Some(Entry::Directory) => return Ok(()),
            Some(Entry::File { .. }) => return Err(VfsError::already_exists(normalized)),
            None => {}
        }

        Self::ensure_parents(&mut entries, &normalized)?;
        entries.insert(normalized, Entry::Directory);
        Ok(())
    }

    async fn remove(&self, path: &str) -> VfsResult<()> {
        let normalized = Self::normalize(path);

        if normalized.is_empty() {
            return Err(VfsError::permission_denied("cannot remove root"));
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| VfsError::other("lock poisoned"))?;

        match entries.get(&normalized) {
            Some(Entry::Directory) => {
                let has_children = entries
                    .keys()
                    .any(|k| Self::parent_of(k) == Some(normalized.as_str()));
                if has_children {
                    return Err(VfsError::directory_not_empty(normalized));
                }
            }
            Some(Entry::File { .. }) => {}
            None => return Err(VfsError::not_found(normalized)),
        }

        entries.remove(&normalized);
        Ok(())
    }
}
