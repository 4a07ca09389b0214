//! Object store
//!
//! Every blob and commit is stored once under `.bitlet/objects`, keyed by the SHA-1 of
//! its framed form and zlib compressed. Objects are never rewritten or deleted.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store `content` as the blob tracked under `name`
    ///
    /// Storing the same name and content twice returns the same ID and keeps one copy.
    pub fn put_blob(&self, name: &Path, content: Bytes) -> anyhow::Result<ObjectId> {
        self.store(&Blob::new(name.to_path_buf(), content))
    }

    pub fn get_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        if !self.contains(object_id) {
            return Err(RepositoryError::BlobNotFound(object_id.clone()).into());
        }

        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;
        match object_type {
            ObjectType::Blob => Blob::deserialize(object_reader),
            ObjectType::Commit => Err(RepositoryError::BlobNotFound(object_id.clone()).into()),
        }
    }

    pub fn put_commit(&self, commit: &Commit) -> anyhow::Result<ObjectId> {
        self.store(commit)
    }

    pub fn get_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let not_found = || RepositoryError::CommitNotFound(object_id.to_string());

        if !self.contains(object_id) {
            return Err(not_found().into());
        }

        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;
        match object_type {
            ObjectType::Commit => Commit::deserialize(object_reader),
            ObjectType::Blob => Err(not_found().into()),
        }
    }

    pub fn get_slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        Ok(self.get_commit(object_id)?.to_slim(object_id.clone()))
    }

    /// Resolve a full or abbreviated commit ID
    ///
    /// Fails with `CommitNotFound` when no stored commit starts with `prefix`, and with
    /// `AmbiguousCommit` when more than one does.
    pub fn resolve_commit(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        let not_found = || RepositoryError::CommitNotFound(prefix.to_string());

        if prefix.is_empty()
            || prefix.len() > OBJECT_ID_LENGTH
            || !prefix.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(not_found().into());
        }

        let mut candidates = self
            .find_objects_by_prefix(&prefix.to_ascii_lowercase())?
            .into_iter()
            .filter(|oid| matches!(self.get_object_type(oid), Ok(ObjectType::Commit)))
            .collect::<Vec<_>>();

        match candidates.len() {
            0 => Err(not_found().into()),
            1 => Ok(candidates.remove(0)),
            _ => {
                candidates.sort();
                Err(RepositoryError::AmbiguousCommit {
                    prefix: prefix.to_string(),
                    candidates: candidates
                        .iter()
                        .map(ObjectId::to_short_oid)
                        .collect(),
                }
                .into())
            }
        }
    }

    /// Every stored commit, ordered by ID
    pub fn all_commits(&self) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let mut commits = Vec::new();

        for oid in self.find_objects_by_prefix("")? {
            let (object_type, object_reader) = self.parse_object_as_bytes(&oid)?;
            if object_type == ObjectType::Commit {
                let commit = Commit::deserialize(object_reader)?;
                commits.push((oid, commit));
            }
        }

        Ok(commits)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        self.read_object(object_path)
    }

    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        // write the object to disk unless it already exists
        if object_path.exists() {
            tracing::trace!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(object_path, object.serialize()?)?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        if !self.contains(object_id) {
            return Err(RepositoryError::BlobNotFound(object_id.clone()).into());
        }

        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
        }
    }

    pub fn get_object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead + use<>)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose ID starts with the given prefix
    ///
    /// For prefixes of 2+ characters only the matching fan-out directory is read.
    /// Results are sorted.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let dir_names = if prefix.len() >= 2 {
            vec![prefix[..2].to_string()]
        } else {
            (0..=255u8).map(|i| format!("{i:02x}")).collect()
        };

        let mut matches = Vec::new();

        for dir_name in dir_names {
            let dir_path = self.path.join(&dir_name);
            if !dir_path.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(&dir_path)? {
                let entry = entry?;
                let full_oid = format!("{}{}", dir_name, entry.file_name().to_string_lossy());

                // temp files and anything else that is not an object ID are skipped
                if full_oid.starts_with(prefix)
                    && let Ok(oid) = ObjectId::try_parse(full_oid)
                {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};
    use walkdir::WalkDir;

    struct Store {
        // keeps the directory alive
        _dir: TempDir,
        database: Database,
    }

    fn new_store() -> Store {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        Store { _dir: dir, database }
    }

    #[fixture]
    fn store() -> Store {
        new_store()
    }

    fn stored_files(database: &Database) -> usize {
        WalkDir::new(database.objects_path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .count()
    }

    #[rstest]
    fn storing_a_blob_twice_keeps_one_copy(store: Store) {
        let first = store.database.put_blob(Path::new("a.txt"), Bytes::from_static(b"hi")).unwrap();
        let second = store.database.put_blob(Path::new("a.txt"), Bytes::from_static(b"hi")).unwrap();

        assert_eq!(first, second);
        assert_eq!(stored_files(&store.database), 1);
    }

    #[rstest]
    fn unknown_blob_is_not_found(store: Store) {
        let error = store.database.get_blob(&ObjectId::try_parse("0".repeat(40)).unwrap()).unwrap_err();

        assert_eq!(
            RepositoryError::find(&error).map(RepositoryError::kind),
            Some(ErrorKind::NotFound)
        );
    }

    #[rstest]
    fn commits_read_back_by_full_and_short_id(store: Store) {
        let oid = store.database.put_commit(&Commit::root()).unwrap();

        assert_eq!(store.database.get_commit(&oid).unwrap(), Commit::root());
        assert_eq!(store.database.resolve_commit(&oid.to_short_oid()).unwrap(), oid);
        assert_eq!(store.database.resolve_commit(&oid.as_ref().to_uppercase()).unwrap(), oid);
    }

    #[rstest]
    fn blob_ids_do_not_resolve_as_commits(store: Store) {
        let oid = store.database.put_blob(Path::new("a.txt"), Bytes::from_static(b"hi")).unwrap();

        let error = store.database.resolve_commit(oid.as_ref()).unwrap_err();
        assert_eq!(
            RepositoryError::find(&error),
            Some(&RepositoryError::CommitNotFound(oid.to_string()))
        );
        assert!(store.database.get_commit(&oid).is_err());
    }

    #[rstest]
    fn shared_prefix_is_ambiguous(store: Store) {
        let mut oids = (0..40)
            .map(|i| {
                let commit = Commit::new(
                    vec![],
                    Commit::root().timestamp(),
                    Default::default(),
                    format!("commit {i}"),
                );
                store.database.put_commit(&commit).unwrap()
            })
            .collect::<Vec<_>>();
        oids.sort();

        // 40 commits over 16 first digits always share one
        let shared = oids
            .windows(2)
            .find(|pair| pair[0].as_ref()[..1] == pair[1].as_ref()[..1])
            .map(|pair| pair[0].as_ref()[..1].to_string())
            .unwrap();

        let error = store.database.resolve_commit(&shared).unwrap_err();
        assert!(matches!(
            RepositoryError::find(&error),
            Some(RepositoryError::AmbiguousCommit { .. })
        ));
    }

    #[rstest]
    fn all_commits_skips_blobs(store: Store) {
        store.database.put_blob(Path::new("a.txt"), Bytes::from_static(b"hi")).unwrap();
        let oid = store.database.put_commit(&Commit::root()).unwrap();

        let commits = store.database.all_commits().unwrap();

        assert_eq!(commits, vec![(oid, Commit::root())]);
    }

    #[rstest]
    fn all_commits_lists_every_commit_by_id(store: Store) {
        let root_oid = store.database.put_commit(&Commit::root()).unwrap();
        let child = Commit::new(
            vec![root_oid.clone()],
            Commit::root().timestamp(),
            Default::default(),
            "child".to_string(),
        );
        let child_oid = store.database.put_commit(&child).unwrap();

        let mut expected = vec![(root_oid, Commit::root()), (child_oid, child)];
        expected.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(store.database.all_commits().unwrap(), expected);
    }

    proptest! {
        #[test]
        fn blob_content_reads_back(
            name in "[a-z]{1,8}(/[a-z]{1,8})?\\.txt",
            content in proptest::collection::vec(any::<u8>(), 0..256)
        ) {
            let store = new_store();
            let oid = store.database.put_blob(Path::new(&name), Bytes::from(content.clone())).unwrap();
            let blob = store.database.get_blob(&oid).unwrap();

            prop_assert_eq!(blob.content().as_ref(), content.as_slice());
            prop_assert_eq!(blob.name(), Path::new(&name));
        }
    }
}
