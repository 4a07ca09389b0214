use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// Walks first parents from a starting commit back to the root
#[derive(Clone, new)]
pub struct FirstParentHistory<'d> {
    database: &'d Database,
    start: ObjectId,
}

impl<'d> IntoIterator for FirstParentHistory<'d> {
    type Item = anyhow::Result<(ObjectId, Commit)>;
    type IntoIter = FirstParentHistoryIter<'d>;

    fn into_iter(self) -> Self::IntoIter {
        FirstParentHistoryIter {
            database: self.database,
            current_commit_oid: Some(self.start),
        }
    }
}

pub struct FirstParentHistoryIter<'d> {
    database: &'d Database,
    current_commit_oid: Option<ObjectId>,
}

impl Iterator for FirstParentHistoryIter<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.current_commit_oid.take()?;

        match self.database.get_commit(&commit_oid) {
            Ok(commit) => {
                self.current_commit_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            Err(error) => Some(Err(error)),
        }
    }
}

/// One history entry
///
/// ```text
/// ===
/// commit <oid>
/// Merge: <first-parent-short> <second-parent-short>
/// Date: Thu Jan 1 00:00:00 1970 +0000
/// <message>
///
/// ```
///
/// The `Merge:` line only appears for merge commits.
pub fn render_entry(commit_oid: &ObjectId, commit: &Commit) -> String {
    let mut entry = format!("===\ncommit {}\n", commit_oid);

    if let (Some(parent), Some(second_parent)) = (commit.parent(), commit.second_parent()) {
        entry.push_str(&format!(
            "Merge: {} {}\n",
            parent.to_short_oid(),
            second_parent.to_short_oid()
        ));
    }

    entry.push_str(&format!(
        "Date: {}\n{}\n\n",
        commit.readable_timestamp(),
        commit.message()
    ));

    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Snapshot;
    use crate::artifacts::objects::object::Object;
    use assert_fs::TempDir;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn oid(seed: char) -> ObjectId {
        ObjectId::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    #[test]
    fn root_commit_entry_has_no_merge_line() {
        let root = Commit::root();

        assert_eq!(
            render_entry(&oid('a'), &root),
            format!(
                "===\ncommit {}\nDate: Thu Jan 1 00:00:00 1970 +0000\ninitial commit\n\n",
                oid('a')
            )
        );
    }

    #[test]
    fn merge_commit_entry_names_both_parents() {
        let timestamp = DateTime::parse_from_rfc2822("Sat, 14 Mar 2026 09:26:53 -0800").unwrap();
        let merge = Commit::new(
            vec![oid('b'), oid('c')],
            timestamp,
            Snapshot::new(),
            "Merged feat into master.".to_string(),
        );

        assert_eq!(
            render_entry(&oid('d'), &merge),
            format!(
                "===\ncommit {}\nMerge: bbbbbbb ccccccc\nDate: Sat Mar 14 09:26:53 2026 -0800\nMerged feat into master.\n\n",
                oid('d')
            )
        );
    }

    #[test]
    fn history_follows_first_parents_only() {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        let timestamp = Commit::root().timestamp();

        let root_oid = database.put_commit(&Commit::root()).unwrap();
        let side = Commit::new(vec![root_oid.clone()], timestamp, Snapshot::new(), "side".into());
        let side_oid = database.put_commit(&side).unwrap();
        let main = Commit::new(vec![root_oid.clone()], timestamp, Snapshot::new(), "main".into());
        let main_oid = database.put_commit(&main).unwrap();
        let merge = Commit::new(
            vec![main_oid.clone(), side_oid],
            timestamp,
            Snapshot::new(),
            "merge".into(),
        );
        let merge_oid = merge.object_id().unwrap();
        database.put_commit(&merge).unwrap();

        let visited = FirstParentHistory::new(&database, merge_oid.clone())
            .into_iter()
            .map(|entry| entry.map(|(oid, _)| oid))
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();

        assert_eq!(visited, vec![merge_oid, main_oid, root_oid]);
    }
}
