use crate::areas::index::Index;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::status::file_change::WorkspaceChange;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

const SEPARATOR: &str = "===";

/// Everything `status` reports, gathered without touching the file system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub(crate) branches: Vec<String>,
    pub(crate) active_branch: String,
    pub(crate) staged_files: BTreeSet<PathBuf>,
    pub(crate) removed_files: BTreeSet<PathBuf>,
    pub(crate) unstaged_changes: BTreeMap<PathBuf, WorkspaceChange>,
    pub(crate) untracked_files: BTreeSet<PathBuf>,
}

impl StatusInfo {
    /// Compare the head snapshot, the staging area and the work tree
    ///
    /// `work_tree` maps every work tree file to the blob ID its current content would get.
    pub fn inspect(
        active_branch: &str,
        head: &Snapshot,
        index: &Index,
        work_tree: &Snapshot,
    ) -> Self {
        let staged = index.additions();
        let removed = index.removals();

        let mut unstaged_changes = BTreeMap::new();

        for (name, staged_id) in staged {
            match work_tree.get(name) {
                None => {
                    unstaged_changes.insert(name.clone(), WorkspaceChange::Deleted);
                }
                Some(working_id) if working_id != staged_id => {
                    unstaged_changes.insert(name.clone(), WorkspaceChange::Modified);
                }
                Some(_) => {}
            }
        }

        for (name, head_id) in head {
            if staged.contains_key(name) || removed.contains_key(name) {
                continue;
            }

            match work_tree.get(name) {
                None => {
                    unstaged_changes.insert(name.clone(), WorkspaceChange::Deleted);
                }
                Some(working_id) if working_id != head_id => {
                    unstaged_changes.insert(name.clone(), WorkspaceChange::Modified);
                }
                Some(_) => {}
            }
        }

        // a file staged for removal but present again is untracked as well
        let untracked_files = work_tree
            .keys()
            .filter(|name| {
                !staged.contains_key(*name)
                    && (!head.contains_key(*name) || removed.contains_key(*name))
            })
            .cloned()
            .collect();

        StatusInfo {
            branches: index.branches().map(str::to_string).collect(),
            active_branch: active_branch.to_string(),
            staged_files: staged.keys().cloned().collect(),
            removed_files: removed.keys().cloned().collect(),
            unstaged_changes,
            untracked_files,
        }
    }

    pub fn untracked_files(&self) -> &BTreeSet<PathBuf> {
        &self.untracked_files
    }

    pub fn unstaged_changes(&self) -> &BTreeMap<PathBuf, WorkspaceChange> {
        &self.unstaged_changes
    }
}

impl fmt::Display for StatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Branches {}", SEPARATOR, SEPARATOR)?;
        for branch in &self.branches {
            let marker = if *branch == self.active_branch { "*" } else { "" };
            writeln!(f, "{}{}", marker, branch)?;
        }

        writeln!(f, "\n{} Staged Files {}", SEPARATOR, SEPARATOR)?;
        for file in &self.staged_files {
            writeln!(f, "{}", file.display())?;
        }

        writeln!(f, "\n{} Removed Files {}", SEPARATOR, SEPARATOR)?;
        for file in &self.removed_files {
            writeln!(f, "{}", file.display())?;
        }

        writeln!(f, "\n{} Modifications Not Staged For Commit {}", SEPARATOR, SEPARATOR)?;
        for (file, change) in &self.unstaged_changes {
            writeln!(f, "{} {}", file.display(), change)?;
        }

        writeln!(f, "\n{} Untracked Files {}", SEPARATOR, SEPARATOR)?;
        for file in &self.untracked_files {
            writeln!(f, "{}", file.display())?;
        }

        Ok(())
    }
}
