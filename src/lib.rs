//! bitlet: a tiny, local, single-user version-control engine
//!
//! The crate is organised the same way as the command line tool that sits on top of it:
//!
//! - `areas`: the persisted parts of a repository (object database, refs, staging area, work tree)
//! - `artifacts`: the data types and algorithms that flow between those areas
//! - `commands`: the operations exposed to the CLI, implemented on `Repository`
//! - `errors`: typed failures surfaced by those operations

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
