//! Recursive copy and removal built on the walker.
//!
//! Both work through the optional content capabilities, so a tree can be
//! copied between any two backends as long as the source has a reader and
//! the destination a writer.

use tokio_util::sync::CancellationToken;

use super::walker::{self, WalkOptions};
use crate::vfs::{ContentReader, ContentWriter, FileType, Handle, VfsError, VfsResult};

fn reader_of(handle: &Handle) -> VfsResult<&dyn ContentReader> {
    handle
        .backend()
        .reader()
        .ok_or_else(|| VfsError::unsupported("read", handle.backend().prefix()))
}

fn writer_of(handle: &Handle) -> VfsResult<&dyn ContentWriter> {
    handle
        .backend()
        .writer()
        .ok_or_else(|| VfsError::unsupported("write", handle.backend().prefix()))
}

fn check_cancelled(cancel: &CancellationToken) -> VfsResult<()> {
    if cancel.is_cancelled() {
        Err(VfsError::Cancelled)
    } else {
        Ok(())
    }
}

/// Copy `src` to `dst`. Returns the number of files copied.
///
/// A file source is copied to `dst` itself. A directory source is
/// recreated at `dst`, keeping only the files `options` lets through at
/// any depth, along with their parent directories. Dangling symlinks are
/// skipped.
#[tracing::instrument(skip(src, dst, options), fields(src = %src, dst = %dst))]
pub async fn copy_tree(src: &Handle, dst: &Handle, options: &WalkOptions) -> VfsResult<u64> {
    check_cancelled(&options.cancel)?;
    let kind = src
        .stat()
        .await
        .map_err(|e| e.at(src.uri()))?
        .ok_or_else(|| VfsError::not_found(src.uri()))?;

    let reader = reader_of(src)?;
    let writer = writer_of(dst)?;

    if kind.is_file() {
        let data = reader.read_all(src.path()).await.map_err(|e| e.at(src.uri()))?;
        writer.write_all(dst.path(), &data).await.map_err(|e| e.at(dst.uri()))?;
        return Ok(1);
    }
    if !kind.is_dir() {
        tracing::warn!(src = %src, "skipping dangling symlink");
        return Ok(0);
    }

    writer
        .create_dir_all(dst.path())
        .await
        .map_err(|e| e.at(dst.uri()))?;

    let entries = walker::collect(src, options).await?;
    let mut copied = 0;
    for entry in entries {
        check_cancelled(&options.cancel)?;
        let target = dst.join(&entry.relative);
        match entry.kind {
            FileType::Directory => {
                writer
                    .create_dir_all(target.path())
                    .await
                    .map_err(|e| e.at(target.uri()))?;
            }
            FileType::File => {
                let data = reader
                    .read_all(entry.handle.path())
                    .await
                    .map_err(|e| e.at(entry.handle.uri()))?;
                writer
                    .write_all(target.path(), &data)
                    .await
                    .map_err(|e| e.at(target.uri()))?;
                copied += 1;
            }
            FileType::Symlink => {
                tracing::warn!(entry = %entry.handle, "skipping dangling symlink");
            }
        }
    }

    tracing::debug!(copied, "tree copied");
    Ok(copied)
}

/// Remove `target` and everything below it. Returns the number of entries
/// removed.
///
/// Children go before their parents. A backend root is emptied but kept.
#[tracing::instrument(skip(target, cancel), fields(target = %target))]
pub async fn remove_tree(target: &Handle, cancel: CancellationToken) -> VfsResult<u64> {
    check_cancelled(&cancel)?;
    let kind = target
        .stat()
        .await
        .map_err(|e| e.at(target.uri()))?
        .ok_or_else(|| VfsError::not_found(target.uri()))?;
    let writer = writer_of(target)?;

    let mut removed = 0;
    if kind.is_dir() {
        let options = WalkOptions::new().with_cancel(cancel.clone());
        let entries = walker::collect(target, &options).await?;
        // Every entry is visited after its parent directory.
        for entry in entries.iter().rev() {
            check_cancelled(&cancel)?;
            writer
                .remove(entry.handle.path())
                .await
                .map_err(|e| e.at(entry.handle.uri()))?;
            removed += 1;
        }
    }

    if !target.name().is_empty() {
        check_cancelled(&cancel)?;
        writer
            .remove(target.path())
            .await
            .map_err(|e| e.at(target.uri()))?;
        removed += 1;
    }

    tracing::debug!(removed, "tree removed");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{Backend, LocalBackend, MemoryBackend};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn mem_with(files: &[(&str, &str)]) -> Handle {
        let fs = MemoryBackend::new();
        for (path, data) in files {
            fs.write_all(path, data.as_bytes()).await.unwrap();
        }
        Handle::new(Arc::new(fs), "")
    }

    #[tokio::test]
    async fn test_copy_tree_between_backends() {
        let src = mem_with(&[("a/one.txt", "1"), ("a/b/two.txt", "2"), ("top", "t")]).await;
        let dir = TempDir::new().unwrap();
        let local: Arc<dyn Backend> = Arc::new(LocalBackend::rooted("proj://", dir.path()));
        let dst = Handle::new(local, "copy");

        let copied = copy_tree(&src, &dst, &WalkOptions::new()).await.unwrap();
        assert_eq!(copied, 3);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("copy/a/b/two.txt")).unwrap(),
            "2"
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("copy/top")).unwrap(), "t");
    }

    #[tokio::test]
    async fn test_copy_single_file() {
        let root = mem_with(&[("x.txt", "data")]).await;
        let copied = copy_tree(&root.join("x.txt"), &root.join("y/z.txt"), &WalkOptions::new())
            .await
            .unwrap();
        assert_eq!(copied, 1);

        let reader = root.backend().reader().unwrap();
        assert_eq!(reader.read_all("y/z.txt").await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_copy_filtered() {
        let root = mem_with(&[("src/a.rs", ""), ("src/b.txt", "")]).await;
        let options = WalkOptions::new().with_patterns(&["*.rs"]).unwrap();
        let copied = copy_tree(&root.join("src"), &root.join("out"), &options)
            .await
            .unwrap();
        assert_eq!(copied, 1);
        assert_eq!(root.join("out/a.rs").stat().await.unwrap(), Some(FileType::File));
        assert_eq!(root.join("out/b.txt").stat().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_copy_filtered_keeps_nested_matches() {
        let src = mem_with(&[
            ("src/deep/main.rs", "fn main() {}"),
            ("src/deep/notes.md", ""),
            ("top.rs", ""),
        ])
        .await;
        let dir = TempDir::new().unwrap();
        let local: Arc<dyn Backend> = Arc::new(LocalBackend::rooted("proj://", dir.path()));

        let options = WalkOptions::new().with_patterns(&["*.rs"]).unwrap();
        let copied = copy_tree(&src, &Handle::new(local, "out"), &options).await.unwrap();
        assert_eq!(copied, 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("out/src/deep/main.rs")).unwrap(),
            "fn main() {}"
        );
        assert!(dir.path().join("out/top.rs").is_file());
        assert!(!dir.path().join("out/src/deep/notes.md").exists());
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let root = mem_with(&[]).await;
        let err = copy_tree(&root.join("nope"), &root.join("out"), &WalkOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VfsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_copy_into_read_only_backend() {
        let src = mem_with(&[("f", "x")]).await;
        let dir = TempDir::new().unwrap();
        let ro: Arc<dyn Backend> =
            Arc::new(LocalBackend::rooted("ro://", dir.path()).with_read_only(true));

        let err = copy_tree(&src.join("f"), &Handle::new(ro, "f"), &WalkOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VfsError::Unsupported { capability: "write", .. }));
    }

    #[tokio::test]
    async fn test_remove_tree() {
        let root = mem_with(&[("d/a", ""), ("d/sub/b", ""), ("keep", "")]).await;

        let removed = remove_tree(&root.join("d"), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(removed, 4);
        assert_eq!(root.join("d").stat().await.unwrap(), None);
        assert_eq!(root.join("keep").stat().await.unwrap(), Some(FileType::File));
    }

    #[tokio::test]
    async fn test_remove_tree_keeps_root() {
        let root = mem_with(&[("a/b", ""), ("c", "")]).await;
        let removed = remove_tree(&root, CancellationToken::new()).await.unwrap();
        assert_eq!(removed, 3);
        assert!(root.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_tree_cancelled() {
        let root = mem_with(&[("d/a", "")]).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = remove_tree(&root.join("d"), cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(root.join("d/a").stat().await.unwrap(), Some(FileType::File));
    }
}
