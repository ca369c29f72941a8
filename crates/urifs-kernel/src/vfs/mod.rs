//! Virtual filesystem abstraction.
//!
//! Key components:
//!
//! - [`Backend`] - Minimal trait every store implements (list, stat, join)
//! - [`Registry`] - Routes URIs to backends by longest prefix
//! - [`Handle`] - A backend plus a clean path, compared by URI
//! - [`MemoryBackend`] - In-memory filesystem (for `mem://`, testing)
//! - [`LocalBackend`] - Local filesystem access (host or rooted)
//!
//! ## Design Decisions
//!
//! - **Path-based**: backends receive clean, backend-relative paths.
//! - **Capability probing**: content access is optional and discovered
//!   through [`Backend::reader`] / [`Backend::writer`].
//! - **Longest-prefix routing**: `Registry` routes to the most specific
//!   prefix that matches.

pub mod backends;
mod backend;
mod error;
mod handle;
mod path;
mod registry;
mod types;

pub use backend::{Backend, ContentReader, ContentWriter};
pub use backends::{InvalidBackend, LocalBackend, MemoryBackend};
pub use error::{VfsError, VfsResult};
pub use handle::Handle;
pub use path::{clean_path, file_name, join_clean};
pub use registry::{BackendInfo, Registry};
pub use types::{DirEntry, FileType};
