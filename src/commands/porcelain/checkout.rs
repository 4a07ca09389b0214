use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::commit::Snapshot;
use crate::errors::RepositoryError;
use std::path::Path;

impl Repository {
    /// Switch to another branch, moving the work tree to its head
    pub fn checkout(&mut self, target: &str) -> anyhow::Result<()> {
        let target = BranchName::try_parse(target.to_string())?;
        let target_oid = self.refs().read_branch(&target)?;

        if self.refs().is_active_branch(&target)? {
            return Err(RepositoryError::AlreadyOnBranch(target.to_string()).into());
        }

        let (current_oid, current) = self.head_commit()?;
        let incoming = self.database().get_commit(&target_oid)?;

        self.migrate_work_tree(current.blobs(), incoming.blobs())?;
        self.refs().set_active(&target)?;

        tracing::info!(
            branch = %target,
            from = %current_oid,
            to = %target_oid,
            "checked out branch"
        );
        eprintln!("Switched to branch '{}'", target);

        Ok(())
    }

    /// Restore one file from the head commit, or from the commit `commit_prefix` names
    ///
    /// The staging area is left alone.
    pub fn checkout_file(&mut self, commit_prefix: Option<&str>, file: &str) -> anyhow::Result<()> {
        let commit = match commit_prefix {
            Some(prefix) => {
                let commit_oid = self.database().resolve_commit(prefix)?;
                self.database().get_commit(&commit_oid)?
            }
            None => self.head_commit()?.1,
        };

        let name = self.workspace().relative_name(Path::new(file));
        let blob_id = commit
            .blob(&name)
            .ok_or_else(|| RepositoryError::FileNotInCommit(name.clone()))?;

        let blob = self.database().get_blob(blob_id)?;
        self.workspace().write_file(&name, blob.content())?;

        tracing::debug!(file = %name.display(), blob = %blob_id, "restored file");

        Ok(())
    }

    /// Move the active branch to any commit, moving the work tree with it
    pub fn reset(&mut self, commit_prefix: &str) -> anyhow::Result<()> {
        let target_oid = self.database().resolve_commit(commit_prefix)?;
        let target = self.database().get_commit(&target_oid)?;
        let (_, current) = self.head_commit()?;

        self.migrate_work_tree(current.blobs(), target.blobs())?;
        self.refs().update_head(&target_oid)?;

        tracing::info!(oid = %target_oid, "reset active branch");

        Ok(())
    }

    /// Rewrite the work tree from one snapshot to another and clear the staging area
    ///
    /// Fails before touching anything if an untracked file is in the way.
    pub(crate) fn migrate_work_tree(&self, from: &Snapshot, to: &Snapshot) -> anyhow::Result<()> {
        let mut migration = Migration::new(self, from, to);
        migration.apply_changes()?;

        self.save_index()
    }
}
