use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;

impl Repository {
    /// Create a branch pointing at the active head, without switching to it
    pub fn branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let head_oid = self.refs().read_head()?;

        self.refs().create_branch(&branch_name, &head_oid)?;
        self.index_mut().register_branch(branch_name.as_ref());

        self.save_index()
    }

    /// Delete a branch pointer; the commits it reached stay in the store
    pub fn rm_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        self.refs().delete_branch(&branch_name)?;
        self.index_mut().unregister_branch(branch_name.as_ref());

        self.save_index()
    }
}
