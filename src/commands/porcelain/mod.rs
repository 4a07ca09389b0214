//! Porcelain commands (user-facing operations)
//!
//! Porcelain commands compose the repository areas into the everyday workflows.
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add` / `rm`: Stage additions and removals
//! - `commit`: Freeze the staging area into a new commit
//! - `status`: Show branches, staged changes and work tree changes
//! - `log`: Show first-parent history, every commit, or commits by message
//! - `branch`: Create or delete branches
//! - `checkout`: Switch branches, restore files, or reset to a commit
//! - `merge`: Three-way merge of another branch into the active one

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod rm;
pub mod status;
