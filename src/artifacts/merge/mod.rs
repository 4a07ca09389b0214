//! Merge engine
//!
//! - `split_finder`: picks the common ancestor used as the merge base
//! - `resolution`: classifies every file against the base and synthesizes conflicts

pub mod resolution;
pub mod split_finder;
