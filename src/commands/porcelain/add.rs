use crate::areas::index::AdditionOutcome;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use std::path::Path;

impl Repository {
    pub fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        // Every file must exist before anything is staged
        let blobs = paths
            .iter()
            .map(|path| {
                let name = self.workspace().relative_name(Path::new(path));
                self.workspace().parse_blob(&name)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let (_, head) = self.head_commit()?;

        for blob in blobs {
            let blob_id = blob.object_id()?;
            let outcome =
                self.index_mut()
                    .stage_addition(blob.name(), blob_id, head.blob(blob.name()));

            if outcome == AdditionOutcome::Staged {
                self.database().store(&blob)?;
            }
        }

        self.save_index()
    }
}
