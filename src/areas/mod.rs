//! Core repository components
//!
//! This module contains the building blocks of a bitlet repository:
//!
//! - `database`: Content-addressed object store for blobs and commits
//! - `index`: Staging area with pending additions, removals and the branch registry
//! - `refs`: Branch heads and the active branch
//! - `repository`: Coordination of the areas for the commands
//! - `workspace`: Working tree file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
