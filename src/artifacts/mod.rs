//! Data structures and algorithms
//!
//! This module contains the types that flow between the repository areas:
//!
//! - `branch`: Branch name validation and symbolic references
//! - `checkout`: Moving the work tree between snapshots with overwrite detection
//! - `index`: Staging area file format (header and checksum)
//! - `log`: History traversal and rendering
//! - `merge`: Split point search and per-file three-way classification
//! - `objects`: Stored object types (blob, commit)
//! - `status`: Working tree status inspection

pub mod branch;
pub mod checkout;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
