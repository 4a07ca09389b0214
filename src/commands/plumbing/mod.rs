//! Plumbing commands (low-level object operations)
//!
//! Plumbing commands give direct access to the object store. They are mostly useful for
//! scripting and for inspecting what the porcelain commands wrote.
//!
//! ## Commands
//!
//! - `hash-object`: Compute a work tree file's blob ID and optionally store it
//! - `cat-file`: Print a stored blob or commit

pub mod cat_file;
pub mod hash_object;
