use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::blob::Blob;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the repository directory inside the work tree
pub const REPOSITORY_DIR: &str = ".bitlet";

const IGNORED_PATHS: [&str; 3] = [REPOSITORY_DIR, ".", ".."];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn a user-supplied path into a name relative to the work tree
    pub fn relative_name(&self, file_path: &Path) -> PathBuf {
        file_path
            .strip_prefix(self.path.as_ref())
            .unwrap_or(file_path)
            .components()
            .filter(|component| !matches!(component, std::path::Component::CurDir))
            .collect()
    }

    /// Read a work tree file as a blob named after `file_path`
    ///
    /// Blob and index records store names as UTF-8, so other names are rejected.
    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        if file_path.to_str().is_none() {
            return Err(RepositoryError::InvalidFileName(file_path.to_path_buf()).into());
        }

        let data = self.read_file(file_path)?;
        Ok(Blob::new(file_path.to_path_buf(), data))
    }

    /// Every trackable file in the work tree, relative to its root and sorted
    ///
    /// Files whose name is not valid UTF-8 cannot be tracked and are left out.
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = WalkDir::new(&self.path)
            .into_iter()
            .filter_entry(|entry| {
                let relative_path = entry.path().strip_prefix(&self.path).unwrap_or(entry.path());
                !Self::is_ignored(relative_path)
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.path.as_ref())
                    .ok()
                    .map(Path::to_path_buf)
            })
            .filter(|name| {
                let trackable = name.to_str().is_some();
                if !trackable {
                    tracing::debug!(file = ?name, "skipping file with a non UTF-8 name");
                }
                trackable
            })
            .collect::<Vec<_>>();

        files.sort();
        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                let name_str = name.to_string_lossy();
                IGNORED_PATHS.contains(&name_str.as_ref())
            } else {
                false
            }
        })
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(file_path);

        if !full_path.is_file() {
            return Err(RepositoryError::FileNotFound(file_path.to_path_buf()).into());
        }

        let content = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(Bytes::from(content))
    }

    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for: {:?}", file_path))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .with_context(|| format!("Failed to open file: {:?}", file_path))?;

        file.write_all(data)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))?;

        Ok(())
    }

    /// Delete a file, then any directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if full_path.is_file() {
            std::fs::remove_file(&full_path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        let mut parent = full_path.parent();
        while let Some(dir) = parent
            && dir != self.path.as_ref()
            && dir.read_dir().map(|mut entries| entries.next().is_none()).unwrap_or(false)
        {
            std::fs::remove_dir(dir)
                .with_context(|| format!("Failed to remove directory: {:?}", dir))?;
            parent = dir.parent();
        }

        Ok(())
    }

    // Deletions go first so a file can replace a directory that only held removed files.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for file_path in migration.deletions() {
            self.remove_file(file_path)?;
        }

        for (file_path, oid) in migration.writes() {
            let blob = migration.load_blob(oid)?;
            self.write_file(file_path, blob.content())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn listing_skips_the_repository_directory() {
        let dir = TempDir::new().unwrap();
        dir.child(".bitlet/objects/ab/cdef").write_str("object").unwrap();
        dir.child("b.txt").write_str("b").unwrap();
        dir.child("nested/a.txt").write_str("a").unwrap();

        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());

        assert_eq!(
            workspace.list_files().unwrap(),
            vec![PathBuf::from("b.txt"), PathBuf::from("nested/a.txt")]
        );
    }

    #[test]
    fn removing_the_last_file_prunes_empty_directories() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());
        workspace.write_file(Path::new("a/b/c.txt"), b"c").unwrap();

        workspace.remove_file(Path::new("a/b/c.txt")).unwrap();

        dir.child("a").assert(predicates::path::missing());
    }

    #[test]
    fn reading_a_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());

        let error = workspace.read_file(Path::new("ghost.txt")).unwrap_err();

        assert_eq!(
            RepositoryError::find(&error),
            Some(&RepositoryError::FileNotFound(PathBuf::from("ghost.txt")))
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_names_are_not_trackable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());
        let name = PathBuf::from(OsStr::from_bytes(b"bad\xff.txt"));
        workspace.write_file(&name, b"bytes").unwrap();
        dir.child("good.txt").write_str("good").unwrap();

        let error = workspace.parse_blob(&name).unwrap_err();

        assert_eq!(
            RepositoryError::find(&error),
            Some(&RepositoryError::InvalidFileName(name.clone()))
        );
        assert_eq!(workspace.list_files().unwrap(), vec![PathBuf::from("good.txt")]);
    }
}
