//! Commit history traversal and rendering
//!
//! - `history`: first-parent walk from a head and the text form of one entry
//!
//! Nothing about the history is persisted besides the commits themselves; every listing
//! is rendered on the fly.

pub mod history;
