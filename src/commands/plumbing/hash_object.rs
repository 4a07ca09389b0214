use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Print the blob ID a work tree file would be stored under
    pub fn hash_object(&mut self, object_path: &str, write: bool) -> anyhow::Result<()> {
        let name = self.workspace().relative_name(Path::new(object_path));
        let object = self.workspace().parse_blob(&name)?;

        let object_id = object.object_id()?;

        writeln!(self.writer(), "{}", object_id)?;

        // write (if write is true) as compressed object file
        if !write {
            return Ok(());
        }

        self.database().store(&object)?;

        Ok(())
    }
}
