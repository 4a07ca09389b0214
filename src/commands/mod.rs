//! Command implementations
//!
//! Commands are `impl Repository` blocks, organized into two categories:
//!
//! - `plumbing`: Low-level object store commands (hash-object, cat-file)
//! - `porcelain`: User-facing version control workflows (add, commit, merge, etc.)

pub mod plumbing;
pub mod porcelain;
