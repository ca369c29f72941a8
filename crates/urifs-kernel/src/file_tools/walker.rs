//! Recursive directory walker over registry handles.
//!
//! Pre-order by directory: every entry of a directory is visited before
//! any of its sub-directories is entered. Sub-directories are entered in
//! listing order, each one re-checked with a fresh `stat` first.
//!
//! Name filters only decide which entries reach the visitor. Every
//! sub-directory is entered whether or not its own name passes, so `*.rs`
//! finds `src/deep/main.rs`.

use tokio_util::sync::CancellationToken;
use urifs_glob::Matcher;

use crate::vfs::{FileType, Handle, VfsError, VfsResult};

/// Options for [`walk`].
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Name filters; an entry is visited if any matches. Empty visits all.
    pub patterns: Vec<Matcher>,
    /// Maximum depth to visit (1 = direct children only).
    pub max_depth: Option<usize>,
    pub cancel: CancellationToken,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile name filters from glob strings.
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> VfsResult<Self> {
        self.patterns = patterns
            .iter()
            .map(|p| Matcher::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn accepts(&self, name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|m| m.matches(name))
    }

    fn check_cancelled(&self) -> VfsResult<()> {
        if self.cancel.is_cancelled() {
            Err(VfsError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// An entry handed to the walk visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub handle: Handle,
    /// Kind as reported by the parent listing.
    pub kind: FileType,
    /// 1 for direct children of the walk base.
    pub depth: usize,
    /// Path relative to the walk base, `/`-separated.
    pub relative: String,
}

/// A directory waiting to be listed.
struct Pending {
    dir: Handle,
    depth: usize,
    relative: String,
}

/// Walk `base`, calling `visit` for each filter-passing entry.
///
/// Filters do not limit descent; only `max_depth` does.
///
/// Stops at the first visitor error, backend error or cancellation, making
/// no further backend calls. Backend errors are reported against the URI
/// that failed.
#[tracing::instrument(skip(base, options, visit), fields(base = %base))]
pub async fn walk<F, E>(base: &Handle, options: &WalkOptions, mut visit: F) -> Result<(), E>
where
    F: FnMut(&WalkEntry) -> Result<(), E>,
    E: From<VfsError>,
{
    let mut stack = vec![Pending {
        dir: base.clone(),
        depth: 0,
        relative: String::new(),
    }];

    while let Some(pending) = stack.pop() {
        if pending.depth > 0 {
            options.check_cancelled()?;
            let is_dir = pending
                .dir
                .is_dir()
                .await
                .map_err(|e| e.at(pending.dir.uri()))?;
            if !is_dir {
                tracing::trace!(dir = %pending.dir, "no longer a directory, skipped");
                continue;
            }
        }

        options.check_cancelled()?;
        let dir = &pending.dir;
        // No pushdown hint: directories failing the filters are still entered.
        let entries = dir
            .backend()
            .list(dir.path(), &[])
            .await
            .map_err(|e| e.at(dir.uri()))?;

        let depth = pending.depth + 1;
        let mut descend = Vec::new();
        for entry in entries {
            let relative = if pending.relative.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", pending.relative, entry.name)
            };
            let walk_entry = WalkEntry {
                handle: dir.join(&entry.name),
                kind: entry.kind,
                depth,
                relative,
            };
            if options.accepts(&entry.name) {
                options.check_cancelled()?;
                visit(&walk_entry)?;
            }

            let maybe_dir = walk_entry.kind.is_dir() || walk_entry.kind.is_symlink();
            if maybe_dir && options.max_depth.is_none_or(|max| depth < max) {
                descend.push(Pending {
                    dir: walk_entry.handle,
                    depth,
                    relative: walk_entry.relative,
                });
            }
        }

        stack.extend(descend.into_iter().rev());
    }

    Ok(())
}

/// Collect every filter-passing entry below `base`, in visit order.
pub async fn collect(base: &Handle, options: &WalkOptions) -> VfsResult<Vec<WalkEntry>> {
    let mut entries = Vec::new();
    walk(base, options, |entry: &WalkEntry| -> VfsResult<()> {
        entries.push(entry.clone());
        Ok(())
    })
    .await?;
    Ok(entries)
}
