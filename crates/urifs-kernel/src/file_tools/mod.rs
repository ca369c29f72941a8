//! Traversal tools over registry handles.
//!
//! - [`GlobEngine`] expands compiled patterns into a lazy match stream.
//! - [`walk`] visits a directory tree with name filters.
//! - [`copy_tree`] / [`remove_tree`] are recursive operations on top of it.

mod glob;
mod tree;
pub mod walker;

pub use glob::{GlobEngine, Match, MatchStream};
pub use tree::{copy_tree, remove_tree};
pub use walker::{WalkEntry, WalkOptions, walk};
