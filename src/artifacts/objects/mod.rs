//! Stored object types and operations
//!
//! Everything bitlet persists in its object database is one of two object types:
//!
//! - **Blob**: the content of one tracked file, addressed together with its file name
//! - **Commit**: a full snapshot (file name to blob address), parent link(s), message and date
//!
//! All objects share the on-disk framing `<type> <size>\0<body>` and are addressed by the
//! SHA-1 of that framed form.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of an abbreviated object id as shown to users
pub const SHORT_OBJECT_ID_LENGTH: usize = 7;
