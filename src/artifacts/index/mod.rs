//! Staging area file format
//!
//! The staging area records pending additions and removals plus the registry of known
//! branch names. It is persisted as a single binary file, `.bitlet/index`.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (20 bytes):
//!   - Signature: "STGE" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Addition count (4 bytes)
//!   - Removal count (4 bytes)
//!   - Branch count (4 bytes)
//!
//! Additions, then removals:
//!   - Blob ID (20 raw bytes)
//!   - Name length (2 bytes) and name
//!
//! Branches:
//!   - Name length (2 bytes) and name
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the staging area header in bytes
pub const HEADER_SIZE: usize = 20; // 4 bytes for marker, 4 for version, 3 * 4 for counts

/// Magic signature identifying staging area files
pub const SIGNATURE: &str = "STGE";

/// Staging area file format version
pub const VERSION: u32 = 1;

/// Size of a raw blob ID in a staging area record
pub const RAW_OID_SIZE: usize = 20;
