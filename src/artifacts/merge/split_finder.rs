//! Split point finder for merges
//!
//! The split point is the common ancestor used as the three-way merge base. It is picked
//! with a breadth-first depth heuristic:
//!
//! 1. Collect every ancestor of the current head and of the other head, following both
//!    parents of merge commits. A commit is its own ancestor.
//! 2. The candidates are the commits reached from both sides.
//! 3. Walk breadth-first from the current head, giving each commit the depth at which it
//!    is first discovered. The candidate with the smallest depth wins; on a tie, the one
//!    discovered first wins. Secondary parents are discovered before primary ones, so
//!    among equally close candidates the side merged in is preferred.
//!
//! This is not a canonical lowest common ancestor. With several merge paths of equal
//! length it can pick a different (but still common) ancestor than git would.
//!
//! ## Debug Logging
//!
//! Building with the `debug_merge` feature prints the visit states and the depth table:
//! `cargo build --features debug_merge`

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Debug logging enabled with the `debug_merge` feature flag
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            eprintln!($($arg)*);
        }
    };
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_CURRENT = 0b01;
        const VISITED_FROM_OTHER = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_CURRENT.bits() | Self::VISITED_FROM_OTHER.bits();
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_CURRENT) {
            flags.push("CURRENT");
        }
        if self.contains(VisitState::VISITED_FROM_OTHER) {
            flags.push("OTHER");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Finds merge split points over any commit storage
///
/// `commit_loader` returns the parents of a commit; the on-disk store and the in-memory
/// graphs used in tests both fit behind it.
pub struct SplitFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> SplitFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Every commit reachable from `head`, `head` included
    pub fn ancestors_of(&self, head: &ObjectId) -> anyhow::Result<HashSet<ObjectId>> {
        Ok(self
            .breadth_first(head)?
            .into_iter()
            .map(|(oid, _)| oid)
            .collect())
    }

    /// Commits reachable from `head` in discovery order, each with the depth at which it
    /// was first discovered
    ///
    /// A merge commit's secondary parent is queued before its primary parent. The visited
    /// set keeps a malformed cyclic graph from looping forever.
    pub fn breadth_first(&self, head: &ObjectId) -> anyhow::Result<Vec<(ObjectId, usize)>> {
        let mut discovered = vec![(head.clone(), 0)];
        let mut visited = HashSet::from([head.clone()]);
        let mut queue = VecDeque::from([(head.clone(), 0)]);

        while let Some((commit_id, depth)) = queue.pop_front() {
            let commit = (self.commit_loader)(&commit_id)?;

            for parent in commit.parents.into_iter().rev() {
                if visited.insert(parent.clone()) {
                    discovered.push((parent.clone(), depth + 1));
                    queue.push_back((parent, depth + 1));
                }
            }
        }

        Ok(discovered)
    }

    /// Pick the split point of `current` and `other`
    ///
    /// Fails only when the two commits share no history at all.
    pub fn find_split_point(
        &self,
        current: &ObjectId,
        other: &ObjectId,
    ) -> anyhow::Result<ObjectId> {
        let from_current = self.breadth_first(current)?;

        let mut states = HashMap::<ObjectId, VisitState>::new();
        for (oid, _) in &from_current {
            *states.entry(oid.clone()).or_insert(VisitState::NONE) |=
                VisitState::VISITED_FROM_CURRENT;
        }
        for oid in self.ancestors_of(other)? {
            *states.entry(oid).or_insert(VisitState::NONE) |= VisitState::VISITED_FROM_OTHER;
        }

        debug_log!(
            "Visit states: {}",
            states
                .iter()
                .map(|(oid, state)| format!("{}: {}", oid.to_short_oid(), state))
                .collect::<Vec<_>>()
                .join(", ")
        );
        debug_log!(
            "Depths from {}: {}",
            current.to_short_oid(),
            from_current
                .iter()
                .map(|(oid, depth)| format!("{}: {}", oid.to_short_oid(), depth))
                .collect::<Vec<_>>()
                .join(", ")
        );

        // discovery order breaks ties between equal depths
        let split_point = from_current
            .into_iter()
            .enumerate()
            .filter(|(_, (oid, _))| {
                states
                    .get(oid)
                    .is_some_and(|state| state.contains(VisitState::VISITED_FROM_BOTH))
            })
            .min_by_key(|(order, (_, depth))| (*depth, *order))
            .map(|(_, (oid, depth))| (oid, depth));

        match split_point {
            Some((oid, depth)) => {
                tracing::debug!(
                    current = %current,
                    other = %other,
                    split = %oid,
                    depth,
                    "found split point"
                );
                Ok(oid)
            }
            None => anyhow::bail!(
                "no common ancestor between {} and {}",
                current.to_short_oid(),
                other.to_short_oid()
            ),
        }
    }
}
