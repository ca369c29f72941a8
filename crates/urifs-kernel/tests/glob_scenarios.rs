//! End-to-end glob behaviour over memory and local backends.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use urifs_kernel::vfs::{ContentWriter, LocalBackend, MemoryBackend};
use urifs_kernel::{GlobEngine, Handle, Match, Pattern, Registry, VfsError};

const TREE: &[&str] = &[
    "D/a/b/c/Hello/World/x/file1.txt",
    "D/a/b/c/Hello/World/x/file2.txt",
    "D/a/b/c/cFile",
];
const EMPTY_DIRS: &[&str] = &["D/a/b/c/Hello/World/y"];

async fn populate(writer: &dyn ContentWriter) {
    for path in TREE {
        writer.write_all(path, b"content").await.unwrap();
    }
    for dir in EMPTY_DIRS {
        writer.create_dir_all(dir).await.unwrap();
    }
}

/// Registry with the scenario tree under `mem://`.
async fn memory_fixture() -> (GlobEngine, Handle) {
    let fs = MemoryBackend::new();
    populate(&fs).await;

    let registry = Arc::new(Registry::new());
    registry.register(Arc::new(fs));
    let base = registry.handle("mem://D");
    (GlobEngine::new(registry), base)
}

/// Registry with the scenario tree in a temp dir under `proj://`.
async fn local_fixture() -> (GlobEngine, Handle, TempDir) {
    let dir = TempDir::new().unwrap();
    let fs = LocalBackend::rooted("proj://", dir.path());
    populate(&fs).await;

    let registry = Arc::new(Registry::new());
    registry.register(Arc::new(fs));
    let base = registry.handle("proj://D");
    (GlobEngine::new(registry), base, dir)
}

async fn run(engine: &GlobEngine, base: &Handle, pattern: &str) -> Vec<Match> {
    engine
        .collect(base, pattern, CancellationToken::new())
        .await
        .unwrap()
}

fn summary(matches: &[Match]) -> Vec<(String, Vec<String>)> {
    matches
        .iter()
        .map(|m| (m.handle.uri(), m.captures.clone()))
        .collect()
}

fn caps(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

async fn check_scenarios(engine: &GlobEngine, base: &Handle, prefix: &str) {
    let uri = |rest: &str| format!("{prefix}D/{rest}");

    assert_eq!(
        summary(&run(engine, base, "*").await),
        vec![(uri("a"), caps(&["a"]))]
    );

    assert_eq!(
        summary(&run(engine, base, "a/b/c/*").await),
        vec![
            (uri("a/b/c/Hello"), caps(&["Hello"])),
            (uri("a/b/c/cFile"), caps(&["cFile"])),
        ]
    );

    assert_eq!(
        summary(&run(engine, base, "*/b/c/*/W???d/x/file[1-2].txt").await),
        vec![
            (
                uri("a/b/c/Hello/World/x/file1.txt"),
                caps(&["a", "Hello", "World", "file1.txt"])
            ),
            (
                uri("a/b/c/Hello/World/x/file2.txt"),
                caps(&["a", "Hello", "World", "file2.txt"])
            ),
        ]
    );

    assert_eq!(
        summary(&run(engine, base, "a/b/c/*/").await),
        vec![(uri("a/b/c/Hello"), caps(&["Hello"]))]
    );

    let malformed = engine.glob_str(base, "a/b/c/[file1.txt", CancellationToken::new());
    assert!(matches!(malformed, Err(VfsError::InvalidPattern(_))));
}

#[tokio::test]
async fn scenarios_on_memory_backend() {
    let (engine, base) = memory_fixture().await;
    check_scenarios(&engine, &base, "mem://").await;
}

#[tokio::test]
async fn scenarios_on_local_backend() {
    let (engine, base, _dir) = local_fixture().await;
    check_scenarios(&engine, &base, "proj://").await;
}

#[tokio::test]
async fn literal_patterns_match_at_most_once() {
    let (engine, base) = memory_fixture().await;

    let found = run(&engine, &base, "a/b/c/cFile").await;
    assert_eq!(summary(&found), vec![("mem://D/a/b/c/cFile".to_string(), vec![])]);

    assert!(run(&engine, &base, "a/b/c/missing").await.is_empty());
    // Directory-only excludes a file even when the path exists.
    assert!(run(&engine, &base, "a/b/c/cFile/").await.is_empty());
    assert_eq!(run(&engine, &base, "a/b/c/Hello/").await.len(), 1);
    // Escaped metacharacters are literal.
    assert!(run(&engine, &base, "a/b/c/\\*").await.is_empty());
}

#[tokio::test]
async fn empty_pattern_yields_base() {
    let (engine, base) = memory_fixture().await;
    let found = run(&engine, &base, "").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].handle, base);
    assert!(found[0].captures.is_empty());
}

#[tokio::test]
async fn capture_count_equals_wildcard_segments() {
    let (engine, base) = memory_fixture().await;
    for raw in ["*", "*/*", "a/*/c/*", "*/b/*/Hello/*/*", "a/b/c/*/World/?"] {
        let pattern = Pattern::compile(raw).unwrap();
        let found: Vec<Match> = engine
            .glob(&base, &pattern, CancellationToken::new())
            .try_collect()
            .await
            .unwrap();
        assert!(!found.is_empty(), "{raw} should match something");
        for m in &found {
            assert_eq!(m.captures.len(), pattern.wildcard_count(), "{raw}");
        }
    }
}

#[tokio::test]
async fn dot_segments_are_canonicalized() {
    let (engine, base) = memory_fixture().await;
    let plain = summary(&run(&engine, &base, "a/b/c/*").await);
    assert_eq!(summary(&run(&engine, &base, "./a//b/./c/*").await), plain);
}

#[tokio::test]
async fn absolute_patterns_ignore_base() {
    let (engine, _) = memory_fixture().await;
    let elsewhere = engine.registry().handle("mem://D/a/b");

    let found = run(&engine, &elsewhere, "mem://D/*").await;
    assert_eq!(summary(&found), vec![("mem://D/a".to_string(), caps(&["a"]))]);

    let none = run(&engine, &elsewhere, "unknown://D/*").await;
    assert!(none.is_empty());
}

#[tokio::test]
async fn host_paths_glob_through_default_backend() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("one.log"), "").unwrap();
    std::fs::write(dir.path().join("two.log"), "").unwrap();
    std::fs::write(dir.path().join("skip.txt"), "").unwrap();

    let engine = GlobEngine::new(Arc::new(Registry::new()));
    let base = engine.registry().handle(&dir.path().display().to_string());
    let found = run(&engine, &base, "*.log").await;
    let names: Vec<_> = found.iter().map(|m| m.handle.name().to_string()).collect();
    assert_eq!(names, vec!["one.log", "two.log"]);
    assert!(found[0].handle.uri().starts_with("file://"));
}

#[tokio::test]
async fn cancellation_mid_stream() {
    let (engine, base) = memory_fixture().await;
    let cancel = CancellationToken::new();
    let mut stream = engine
        .glob_str(&base, "*/*/*/*/*/*/*", cancel.clone())
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert!(first.handle.uri().ends_with("file1.txt"));

    cancel.cancel();
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn dropped_registry_entry_stops_resolution() {
    let (engine, base) = memory_fixture().await;
    let backend = Arc::clone(base.backend());
    assert!(engine.registry().unregister(&backend));

    // Existing handles keep their backend alive.
    assert_eq!(run(&engine, &base, "*").await.len(), 1);
    // New resolutions no longer find it.
    assert!(engine.registry().handle("mem://D").is_invalid());
}
