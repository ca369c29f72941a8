//! VFS backends.
//!
//! Backends implement [`Backend`](super::Backend) for different storage types.

mod invalid;
mod local;
mod memory;

pub use invalid::InvalidBackend;
pub use local::LocalBackend;
pub use memory::MemoryBackend;
