//! Working tree status inspection
//!
//! Status compares three states: the head commit, the staging area and the work tree.
//!
//! ## Components
//!
//! - `file_change`: Kinds of unstaged work tree changes
//! - `status_info`: The comparison itself and its text form

pub mod file_change;
pub mod status_info;
