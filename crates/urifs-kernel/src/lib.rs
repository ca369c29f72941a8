//! # urifs-kernel
//!
//! URI-addressed virtual filesystem with a backend registry and a lazy
//! glob engine.
//!
//! Every location is a [`Handle`]: a backend plus a clean backend-relative
//! path, printed as `prefix + path` (`mem://a/b`, `file:///tmp`). The
//! [`Registry`] routes URIs to backends by longest prefix; unprefixed paths
//! go to the host filesystem and anything unroutable becomes the invalid
//! handle, which fails every operation.
//!
//! On top of that:
//! - [`GlobEngine`] expands segment-wise patterns into a cancellable
//!   [`MatchStream`] with per-wildcard captures
//! - [`walk`] visits trees with name filters
//! - [`copy_tree`] / [`remove_tree`] work across backends
//! - [`RegistryConfig`] registers extra backends from TOML
//!
//! The free functions below operate on [`Registry::global`].

pub mod config;
pub mod file_tools;
pub mod vfs;

use tokio_util::sync::CancellationToken;

pub use config::{BackendConfig, BackendKind, RegistryConfig};
pub use file_tools::{
    GlobEngine, Match, MatchStream, WalkEntry, WalkOptions, copy_tree, remove_tree, walk,
};
pub use urifs_glob::{Matcher, Pattern, PatternError};
pub use vfs::{
    Backend, DirEntry, FileType, Handle, LocalBackend, MemoryBackend, Registry, VfsError,
    VfsResult,
};

/// Resolve a URI against the global registry.
pub fn handle(uri: &str) -> Handle {
    Registry::global().handle(uri)
}

/// Glob `pattern` below `base` using the global registry.
pub fn glob(base: &Handle, pattern: &str, cancel: CancellationToken) -> VfsResult<MatchStream> {
    GlobEngine::new(Registry::global()).glob_str(base, pattern, cancel)
}
