use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(RepositoryError::AlreadyInitialized.into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .bitlet/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .bitlet/refs/heads directory")?;

        let root_oid = self.database().put_commit(&Commit::root())?;

        let default_branch = BranchName::default_branch();
        self.refs()
            .create_branch(&default_branch, &root_oid)
            .context("Failed to create the default branch")?;
        self.refs()
            .set_active(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        {
            let mut index = self.index_mut();
            index.register_branch(default_branch.as_ref());
            index.write_updates()?;
        }

        tracing::info!(path = %self.path().display(), root = %root_oid, "initialized repository");

        writeln!(
            self.writer(),
            "Initialized empty bitlet repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
