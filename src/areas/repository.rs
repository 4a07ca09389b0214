use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{REPOSITORY_DIR, Workspace};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::cell::{Ref, RefCell, RefMut};
use std::path::Path;

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Bind to the work tree at `path` without touching `.bitlet/`
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);

        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;
        let repository_path = path.join(REPOSITORY_DIR);

        let index = Index::new(repository_path.join("index").into_boxed_path());
        let database = Database::new(repository_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(repository_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
        })
    }

    /// Bind to an initialized work tree and load its staging area
    pub fn open(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repository = Self::new(path, writer)?;

        if !repository.is_initialized() {
            return Err(RepositoryError::NotInitialized.into());
        }
        repository.index_mut().rehydrate()?;

        Ok(repository)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Ref<'_, Index> {
        self.index.borrow()
    }

    pub fn index_mut(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn is_initialized(&self) -> bool {
        self.refs.head_path().is_file()
    }

    /// Write the staging area back if anything changed
    pub fn save_index(&self) -> anyhow::Result<()> {
        let mut index = self.index_mut();

        if index.is_changed() {
            index.write_updates()?;
        }

        Ok(())
    }

    /// Head commit of the active branch, with its ID
    pub fn head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        let head_oid = self.refs.read_head()?;
        let head = self.database.get_commit(&head_oid)?;

        Ok((head_oid, head))
    }

    /// Freeze the staging area into a new commit on the active branch
    ///
    /// The new snapshot is the head snapshot with the pending changes applied. Callers
    /// check their own preconditions first; this always seals.
    pub(crate) fn write_commit(
        &self,
        message: String,
        secondary_parent: Option<ObjectId>,
    ) -> anyhow::Result<(ObjectId, Commit)> {
        let (head_oid, head) = self.head_commit()?;
        let blobs = self.index().apply_to(head.blobs());

        let mut parents = vec![head_oid];
        parents.extend(secondary_parent);

        let commit = Commit::new(parents, Commit::timestamp_from_env(), blobs, message);
        let commit_oid = self.database.put_commit(&commit)?;
        self.refs.update_head(&commit_oid)?;

        self.index_mut().clear_changes();
        self.save_index()?;

        tracing::info!(
            oid = %commit_oid,
            files = commit.blobs().len(),
            merge = commit.is_merge(),
            "sealed commit"
        );

        Ok((commit_oid, commit))
    }
}
