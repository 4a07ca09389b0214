//! Moving the work tree between commits
//!
//! Checkout, reset and merge all replace the tracked files of one commit with those of
//! another. Every untracked file that would be overwritten is detected before anything
//! on disk changes.

pub mod migration;
