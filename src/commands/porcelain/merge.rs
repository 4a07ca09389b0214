use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::resolution::{MergeAction, MergeResolution, conflict_content};
use crate::artifacts::merge::split_finder::SplitFinder;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::io::Write;
use std::path::Path;

pub const ANCESTOR_NOTICE: &str = "Given branch is an ancestor of the current branch.";
pub const FAST_FORWARD_NOTICE: &str = "Current branch fast-forwarded.";
pub const CONFLICT_NOTICE: &str = "Encountered a merge conflict.";

/// How a merge ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The other head is already part of the current history
    AlreadyUpToDate,
    /// The current branch was moved to the other head; no commit was made
    FastForwarded { head: ObjectId },
    /// A two-parent commit was sealed, possibly with conflict markers in it
    Merged { commit: ObjectId, conflicted: bool },
}

impl Repository {
    /// Merge the branch `target` into the active branch
    ///
    /// Every precondition is checked before the work tree, the staging area or any ref
    /// is touched.
    pub fn merge(&mut self, target: &str) -> anyhow::Result<MergeOutcome> {
        if !self.index().has_branch(target) {
            return Err(RepositoryError::UnknownMergeTarget(target.to_string()).into());
        }

        let target_branch = BranchName::try_parse(target.to_string())?;
        let current_branch = self.refs().active_branch()?;

        if target_branch == current_branch {
            return Err(RepositoryError::MergeWithSelf(target.to_string()).into());
        }
        if !self.index().is_empty() {
            return Err(RepositoryError::UncommittedChanges.into());
        }

        let (head_oid, head) = self.head_commit()?;
        let other_oid = self.refs().read_branch(&target_branch)?;
        let other = self.database().get_commit(&other_oid)?;

        Migration::new(self, head.blobs(), other.blobs()).plan_changes()?;

        let split_oid = SplitFinder::new(|oid: &ObjectId| self.database().get_slim_commit(oid))
            .find_split_point(&head_oid, &other_oid)?;

        if split_oid == head_oid {
            self.migrate_work_tree(head.blobs(), other.blobs())?;
            self.refs().update_head(&other_oid)?;

            tracing::info!(branch = %current_branch, to = %other_oid, "fast-forwarded");
            writeln!(self.writer(), "{}", FAST_FORWARD_NOTICE)?;

            return Ok(MergeOutcome::FastForwarded { head: other_oid });
        }

        if split_oid == other_oid {
            writeln!(self.writer(), "{}", ANCESTOR_NOTICE)?;
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let split = self.database().get_commit(&split_oid)?;
        let resolution = MergeResolution::new(split.blobs(), head.blobs(), other.blobs());

        for (name, action) in resolution.effective_actions() {
            self.apply_merge_action(name, action, head.blobs())?;
        }

        let message = format!("Merged {} into {}.", target_branch, current_branch);
        let (commit_oid, _) = self.write_commit(message, Some(other_oid))?;

        let conflicted = resolution.has_conflicts();
        if conflicted {
            tracing::info!(commit = %commit_oid, "merge sealed with conflicts");
            writeln!(self.writer(), "{}", CONFLICT_NOTICE)?;
        }

        Ok(MergeOutcome::Merged {
            commit: commit_oid,
            conflicted,
        })
    }

    fn apply_merge_action(
        &self,
        name: &Path,
        action: &MergeAction,
        head: &Snapshot,
    ) -> anyhow::Result<()> {
        match action {
            MergeAction::Unchanged | MergeAction::KeepHead => {}
            MergeAction::TakeOther(blob_id) | MergeAction::AddFromOther(blob_id) => {
                let blob = self.database().get_blob(blob_id)?;
                self.workspace().write_file(name, blob.content())?;
                self.index_mut().stage_addition(name, blob_id.clone(), None);
            }
            MergeAction::Remove => {
                self.index_mut().stage_removal(name, head.get(name))?;
                self.workspace().remove_file(name)?;
            }
            MergeAction::Conflict {
                head: head_id,
                other: other_id,
            } => {
                let head_content = self.load_content(head_id.as_ref())?;
                let other_content = self.load_content(other_id.as_ref())?;
                let content = conflict_content(head_content.as_deref(), other_content.as_deref());

                self.workspace().write_file(name, &content)?;
                let blob_id = self
                    .database()
                    .store(&Blob::new(name.to_path_buf(), content))?;
                self.index_mut().stage_addition(name, blob_id, None);
            }
        }

        Ok(())
    }

    fn load_content(&self, blob_id: Option<&ObjectId>) -> anyhow::Result<Option<bytes::Bytes>> {
        match blob_id {
            Some(blob_id) => Ok(Some(self.database().get_blob(blob_id)?.into_content())),
            None => Ok(None),
        }
    }
}
