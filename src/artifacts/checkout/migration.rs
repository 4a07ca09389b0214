//! Work tree migration between two snapshots
//!
//! A migration moves the work tree from the snapshot of the current head to a target
//! snapshot:
//!
//! 1. Files tracked by the current head but not by the target are deleted
//! 2. Every file tracked by the target is written
//! 3. The staging area is cleared
//!
//! Files tracked by neither snapshot are left alone.
//!
//! ## Safety
//!
//! Planning fails with `UnsafeOverwrite` when a work tree file that the current head does
//! not track would be replaced by different content from the target. Nothing is touched
//! until planning succeeds.

use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub struct Migration<'r> {
    repository: &'r Repository,
    /// Snapshot of the current head
    from: &'r Snapshot,
    /// Snapshot to move to
    to: &'r Snapshot,
    deletions: BTreeSet<PathBuf>,
    writes: BTreeMap<PathBuf, ObjectId>,
    /// Untracked files the target would overwrite
    conflicts: BTreeSet<PathBuf>,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, from: &'r Snapshot, to: &'r Snapshot) -> Self {
        Self {
            repository,
            from,
            to,
            deletions: BTreeSet::new(),
            writes: BTreeMap::new(),
            conflicts: BTreeSet::new(),
        }
    }

    pub fn deletions(&self) -> &BTreeSet<PathBuf> {
        &self.deletions
    }

    pub fn writes(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.writes
    }

    /// Plan, then rewrite the work tree and clear the staging area
    pub fn apply_changes(&mut self) -> anyhow::Result<()> {
        self.plan_changes()?;
        self.update_workspace()?;
        self.update_index();

        Ok(())
    }

    /// Detect unsafe overwrites and record the file operations, without touching disk
    pub fn plan_changes(&mut self) -> anyhow::Result<()> {
        self.check_for_conflicts()?;

        if !self.conflicts.is_empty() {
            let conflicts = self.conflicts.iter().cloned().collect::<Vec<_>>();
            tracing::debug!(files = ?conflicts, "untracked files would be overwritten");
            return Err(RepositoryError::UnsafeOverwrite(conflicts).into());
        }

        self.deletions = self
            .from
            .keys()
            .filter(|name| !self.to.contains_key(*name))
            .cloned()
            .collect();
        self.writes = self.to.clone();

        tracing::debug!(
            deletions = self.deletions.len(),
            writes = self.writes.len(),
            "planned work tree migration"
        );

        Ok(())
    }

    fn check_for_conflicts(&mut self) -> anyhow::Result<()> {
        let workspace = self.repository.workspace();

        for name in workspace.list_files()? {
            if self.from.contains_key(&name) {
                continue;
            }

            let Some(incoming) = self.to.get(&name) else {
                continue;
            };

            let working_copy = workspace.parse_blob(&name)?.object_id()?;
            if &working_copy != incoming {
                self.conflicts.insert(name);
            }
        }

        Ok(())
    }

    fn update_workspace(&self) -> anyhow::Result<()> {
        self.repository.workspace().apply_migration(self)
    }

    fn update_index(&self) {
        self.repository.index_mut().clear_changes();
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        self.repository.database().get_blob(object_id)
    }
}
