use crate::areas::repository::Repository;
use std::path::Path;

impl Repository {
    /// Unstage a file, or stage the removal of a tracked file and delete it
    pub fn rm(&mut self, path: &str) -> anyhow::Result<()> {
        let name = self.workspace().relative_name(Path::new(path));
        let (_, head) = self.head_commit()?;

        let tracked = self.index_mut().stage_removal(&name, head.blob(&name))?;
        if tracked {
            self.workspace().remove_file(&name)?;
        }

        self.save_index()
    }
}
