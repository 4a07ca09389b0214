use crate::areas::repository::Repository;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    pub fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        let message = message.trim();

        if message.is_empty() {
            return Err(RepositoryError::EmptyMessage.into());
        }
        if self.index().is_empty() {
            return Err(RepositoryError::NoChanges.into());
        }

        let (commit_id, commit) = self.write_commit(message.to_string(), None)?;
        let branch = self.refs().active_branch()?;

        writeln!(
            self.writer(),
            "[{} {}] {}",
            branch,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
