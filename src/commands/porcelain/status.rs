use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object::Object;
use crate::artifacts::status::status_info::StatusInfo;
use std::io::Write;

impl Repository {
    pub fn status(&self) -> anyhow::Result<()> {
        let active_branch = self.refs().active_branch()?;
        let (_, head) = self.head_commit()?;

        let mut work_tree = Snapshot::new();
        for name in self.workspace().list_files()? {
            let blob_id = self.workspace().parse_blob(&name)?.object_id()?;
            work_tree.insert(name, blob_id);
        }

        let status = StatusInfo::inspect(
            active_branch.as_ref(),
            head.blobs(),
            &self.index(),
            &work_tree,
        );
        write!(self.writer(), "{}", status)?;

        Ok(())
    }
}
