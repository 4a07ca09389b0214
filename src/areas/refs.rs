//! Branch references
//!
//! A branch is a file under `.bitlet/refs/heads/` holding the ID of its head commit.
//! `.bitlet/HEAD` names the active branch as a symbolic reference:
//!
//! ```text
//! ref: refs/heads/master
//! ```
//!
//! The commit graph itself is immutable; these files are the only mutable pointers into it.

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (typically `.bitlet`)
    path: Box<Path>,
}

impl Refs {
    /// The active branch, as named by HEAD
    pub fn active_branch(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        let symref_match = regex::Regex::new(SYMREF_REGEX)?
            .captures(content.trim())
            .with_context(|| format!("HEAD is not a symbolic reference: {}", content.trim()))?;

        BranchName::try_parse_sym_ref_name(&SymRefName::new(symref_match[1].to_string()))
    }

    pub fn is_active_branch(&self, name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.active_branch()? == name)
    }

    /// Make `name` the active branch
    pub fn set_active(&self, name: &BranchName) -> anyhow::Result<()> {
        let sym_ref = name.to_sym_ref_name();
        self.update_ref_file(&self.head_path(), &format!("ref: {}", sym_ref.as_ref_path()))?;

        tracing::debug!(branch = %name, "switched active branch");
        Ok(())
    }

    /// Head commit of the active branch
    pub fn read_head(&self) -> anyhow::Result<ObjectId> {
        let branch = self.active_branch()?;
        self.read_branch(&branch)
    }

    /// Move the active branch to `oid`
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let branch = self.active_branch()?;
        self.set_head(&branch, oid)
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.branch_path(name);

        if !branch_path.is_file() {
            return Err(RepositoryError::BranchNotFound(name.to_string()).into());
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read ref file at {:?}", branch_path))?;

        ObjectId::try_parse(content.trim().to_string())
    }

    /// Point an existing branch at `oid`
    ///
    /// The caller makes sure `oid` is a stored commit.
    pub fn set_head(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        if !self.branch_exists(name) {
            return Err(RepositoryError::BranchNotFound(name.to_string()).into());
        }

        self.update_ref_file(&self.branch_path(name), oid.as_ref())?;

        tracing::debug!(branch = %name, oid = %oid, "moved branch head");
        Ok(())
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(RepositoryError::BranchAlreadyExists(name.to_string()).into());
        }

        self.update_ref_file(&self.branch_path(name), source_oid.as_ref())?;

        tracing::info!(branch = %name, oid = %source_oid, "created branch");
        Ok(())
    }

    /// Delete a branch that is not the active one, returning its last head
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        if self.is_active_branch(name)? {
            return Err(RepositoryError::CannotDeleteActive(name.to_string()).into());
        }

        let oid = self.read_branch(name)?;
        let branch_path = self.branch_path(name);

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        tracing::info!(branch = %name, oid = %oid, "deleted branch");
        Ok(oid)
    }

    /// Every branch, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let mut branches = WalkDir::new(self.heads_path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                let sym_ref = SymRefName::new(relative_path.to_string_lossy().replace('\\', "/"));
                BranchName::try_parse_sym_ref_name(&sym_ref).ok()
            })
            .collect::<Vec<_>>();

        branches.sort();
        Ok(branches)
    }

    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!("failed to create parent directories for ref file at {:?}", path)
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        ref_file.write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.path
            .join(name.to_sym_ref_name().as_ref_path())
            .into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
