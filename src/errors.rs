//! Repository errors
//!
//! Operations return `anyhow::Result`, but every failure caused by caller input or
//! repository state is raised as a [`RepositoryError`] so callers can recover the
//! kind with `downcast_ref`. I/O failures stay plain `anyhow` errors with context.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`RepositoryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidOperation,
    UnsafeOverwrite,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Not in an initialized bitlet directory.")]
    NotInitialized,

    #[error("A bitlet version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("File does not exist.")]
    FileNotFound(PathBuf),

    #[error("No object with id {0} exists.")]
    BlobNotFound(ObjectId),

    #[error("No commit with that id exists.")]
    CommitNotFound(String),

    #[error("short id {prefix} is ambiguous; candidates are: {}", .candidates.join(", "))]
    AmbiguousCommit {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("File name {} is not valid UTF-8.", .0.display())]
    InvalidFileName(PathBuf),

    #[error("File does not exist in that commit.")]
    FileNotInCommit(PathBuf),

    #[error("Found no commit with that message.")]
    MessageNotFound(String),

    #[error("A branch with that name does not exist.")]
    BranchNotFound(String),

    #[error("A branch with that name already exists.")]
    BranchAlreadyExists(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No changes added to the commit.")]
    NoChanges,

    #[error("No reason to remove the file.")]
    NothingToRemove(PathBuf),

    #[error("Cannot remove the current branch.")]
    CannotDeleteActive(String),

    #[error("No need to checkout the current branch.")]
    AlreadyOnBranch(String),

    #[error("A branch with that name does not exist.")]
    UnknownMergeTarget(String),

    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf(String),

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UnsafeOverwrite(Vec<PathBuf>),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::FileNotFound(_)
            | RepositoryError::BlobNotFound(_)
            | RepositoryError::CommitNotFound(_)
            | RepositoryError::FileNotInCommit(_)
            | RepositoryError::MessageNotFound(_)
            | RepositoryError::BranchNotFound(_) => ErrorKind::NotFound,
            RepositoryError::BranchAlreadyExists(_) => ErrorKind::AlreadyExists,
            RepositoryError::UnsafeOverwrite(_) => ErrorKind::UnsafeOverwrite,
            RepositoryError::NotInitialized
            | RepositoryError::AlreadyInitialized
            | RepositoryError::AmbiguousCommit { .. }
            | RepositoryError::InvalidBranchName(_)
            | RepositoryError::InvalidFileName(_)
            | RepositoryError::EmptyMessage
            | RepositoryError::NoChanges
            | RepositoryError::NothingToRemove(_)
            | RepositoryError::CannotDeleteActive(_)
            | RepositoryError::AlreadyOnBranch(_)
            | RepositoryError::UnknownMergeTarget(_)
            | RepositoryError::MergeWithSelf(_)
            | RepositoryError::UncommittedChanges => ErrorKind::InvalidOperation,
        }
    }

    /// Recover the repository error behind an `anyhow` chain, if there is one
    pub fn find(error: &anyhow::Error) -> Option<&RepositoryError> {
        error.chain().find_map(|cause| cause.downcast_ref::<RepositoryError>())
    }
}
