//! Per-file three-way merge classification
//!
//! Every file name tracked by the split point, the current head or the other head is
//! classified by comparing its blob IDs in the three snapshots. Blob IDs stand in for
//! content: the same name with the same bytes always has the same ID.
//!
//! | split vs head | split vs other | head vs other | action                         |
//! |---------------|----------------|---------------|--------------------------------|
//! | same          | same           | same          | nothing                        |
//! | changed       | same           |               | keep head                      |
//! | same          | changed        |               | take other / add / remove      |
//! | changed       | changed        | same          | nothing                        |
//! | changed       | changed        | different     | conflict                       |

use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const CONFLICT_HEAD_MARKER: &str = "<<<<<<< HEAD\n";
pub const CONFLICT_SEPARATOR: &str = "=======\n";
pub const CONFLICT_END_MARKER: &str = ">>>>>>>\n";

/// The blob a file has in each of the three snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileVersions<'s> {
    pub split: Option<&'s ObjectId>,
    pub head: Option<&'s ObjectId>,
    pub other: Option<&'s ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAction {
    /// Identical everywhere, or changed the same way on both sides
    Unchanged,
    /// Changed only on the current branch
    KeepHead,
    /// Modified only on the other branch: check it out and stage it
    TakeOther(ObjectId),
    /// Added only on the other branch: check it out and stage it
    AddFromOther(ObjectId),
    /// Deleted only on the other branch: delete it and stage the removal
    Remove,
    /// Changed differently on both sides
    Conflict {
        head: Option<ObjectId>,
        other: Option<ObjectId>,
    },
}

impl MergeAction {
    pub fn classify(versions: FileVersions<'_>) -> Self {
        let FileVersions { split, head, other } = versions;

        match (split != head, split != other) {
            (false, false) => MergeAction::Unchanged,
            (true, false) => MergeAction::KeepHead,
            (false, true) => match (split.is_some(), other) {
                (true, Some(other)) => MergeAction::TakeOther(other.clone()),
                (false, Some(other)) => MergeAction::AddFromOther(other.clone()),
                (_, None) => MergeAction::Remove,
            },
            (true, true) if head == other => MergeAction::Unchanged,
            (true, true) => MergeAction::Conflict {
                head: head.cloned(),
                other: other.cloned(),
            },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, MergeAction::Conflict { .. })
    }
}

/// The classified merge of three snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResolution {
    actions: BTreeMap<PathBuf, MergeAction>,
}

impl MergeResolution {
    pub fn new(split: &Snapshot, head: &Snapshot, other: &Snapshot) -> Self {
        let names = split
            .keys()
            .chain(head.keys())
            .chain(other.keys())
            .collect::<BTreeSet<_>>();

        let actions = names
            .into_iter()
            .map(|name| {
                let versions = FileVersions {
                    split: split.get(name),
                    head: head.get(name),
                    other: other.get(name),
                };
                let action = MergeAction::classify(versions);
                tracing::trace!(file = %name.display(), ?action, "classified file");

                (name.clone(), action)
            })
            .collect();

        Self { actions }
    }

    pub fn actions(&self) -> &BTreeMap<PathBuf, MergeAction> {
        &self.actions
    }

    pub fn action(&self, name: &Path) -> Option<&MergeAction> {
        self.actions.get(name)
    }

    pub fn has_conflicts(&self) -> bool {
        self.actions.values().any(MergeAction::is_conflict)
    }

    /// Actions that change the work tree or the staging area
    pub fn effective_actions(&self) -> impl Iterator<Item = (&PathBuf, &MergeAction)> {
        self.actions
            .iter()
            .filter(|(_, action)| !matches!(action, MergeAction::Unchanged | MergeAction::KeepHead))
    }
}

/// Content written in place of a conflicted file
///
/// An absent side contributes nothing between its markers.
pub fn conflict_content(head: Option<&[u8]>, other: Option<&[u8]>) -> Bytes {
    let head = head.unwrap_or_default();
    let other = other.unwrap_or_default();

    let mut content = Vec::with_capacity(
        CONFLICT_HEAD_MARKER.len()
            + head.len()
            + CONFLICT_SEPARATOR.len()
            + other.len()
            + CONFLICT_END_MARKER.len(),
    );
    content.extend_from_slice(CONFLICT_HEAD_MARKER.as_bytes());
    content.extend_from_slice(head);
    content.extend_from_slice(CONFLICT_SEPARATOR.as_bytes());
    content.extend_from_slice(other);
    content.extend_from_slice(CONFLICT_END_MARKER.as_bytes());

    Bytes::from(content)
}
