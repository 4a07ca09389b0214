use crate::areas::repository::Repository;
use crate::artifacts::log::history::{FirstParentHistory, render_entry};
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// First-parent history of the active branch, newest first
    pub fn log(&self) -> anyhow::Result<()> {
        let head_oid = self.refs().read_head()?;

        for entry in FirstParentHistory::new(self.database(), head_oid) {
            let (commit_oid, commit) = entry?;
            write!(self.writer(), "{}", render_entry(&commit_oid, &commit))?;
        }

        Ok(())
    }

    /// Every commit ever made, in no particular history order
    pub fn global_log(&self) -> anyhow::Result<()> {
        for (commit_oid, commit) in self.database().all_commits()? {
            write!(self.writer(), "{}", render_entry(&commit_oid, &commit))?;
        }

        Ok(())
    }

    /// Print the IDs of all commits whose message is exactly `message`
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let matches = self
            .database()
            .all_commits()?
            .into_iter()
            .filter(|(_, commit)| commit.message() == message)
            .map(|(commit_oid, _)| commit_oid)
            .collect::<Vec<_>>();

        if matches.is_empty() {
            return Err(RepositoryError::MessageNotFound(message.to_string()).into());
        }

        for commit_oid in matches {
            writeln!(self.writer(), "{}", commit_oid)?;
        }

        Ok(())
    }
}
