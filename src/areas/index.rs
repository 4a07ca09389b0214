//! Staging area
//!
//! The staging area holds everything that changes between the head commit and the next
//! one: pending additions (file name to blob ID), pending removals (file name to the blob
//! ID the head commit tracked), and the registry of known branch names.
//!
//! A file name is never pending in both additions and removals at once: staging one side
//! always clears the other.
//!
//! The in-memory operations never touch the file system. `rehydrate` and `write_updates`
//! move the whole state to and from `.bitlet/index` (see `artifacts::index` for the
//! format).

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, RAW_OID_SIZE};
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use byteorder::{ByteOrder, WriteBytesExt};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// What `stage_addition` did with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionOutcome {
    /// The file differs from the head commit and is now pending
    Staged,
    /// The file matches the head commit, so nothing is pending for it
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Path to the staging area file (typically `.bitlet/index`)
    path: Box<Path>,
    additions: BTreeMap<PathBuf, ObjectId>,
    removals: BTreeMap<PathBuf, ObjectId>,
    branches: BTreeSet<String>,
    /// Flag indicating if the staging area has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            additions: BTreeMap::new(),
            removals: BTreeMap::new(),
            branches: BTreeSet::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.removals
    }

    pub fn branches(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(String::as_str)
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// No pending additions and no pending removals
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Record `name` as a pending addition of `oid`
    ///
    /// `head_oid` is the blob the head commit tracks under `name`. When it equals `oid`
    /// the file is unchanged and any pending addition is dropped instead. Either way the
    /// pending removal of `name` is cleared.
    pub fn stage_addition(
        &mut self,
        name: &Path,
        oid: ObjectId,
        head_oid: Option<&ObjectId>,
    ) -> AdditionOutcome {
        self.removals.remove(name);
        self.changed = true;

        if head_oid == Some(&oid) {
            self.additions.remove(name);
            tracing::debug!(file = %name.display(), "file matches head commit, nothing to stage");
            AdditionOutcome::Unchanged
        } else {
            tracing::debug!(file = %name.display(), blob = %oid, "staged addition");
            self.additions.insert(name.to_path_buf(), oid);
            AdditionOutcome::Staged
        }
    }

    /// Record `name` as a pending removal
    ///
    /// `head_oid` is the blob the head commit tracks under `name`. Fails when `name` is
    /// neither pending addition nor tracked by the head commit. Returns true when the
    /// file is tracked and the caller must delete it from the working tree.
    pub fn stage_removal(
        &mut self,
        name: &Path,
        head_oid: Option<&ObjectId>,
    ) -> anyhow::Result<bool> {
        let was_added = self.additions.remove(name).is_some();

        match head_oid {
            Some(oid) => {
                tracing::debug!(file = %name.display(), blob = %oid, "staged removal");
                self.removals.insert(name.to_path_buf(), oid.clone());
                self.changed = true;
                Ok(true)
            }
            None if was_added => {
                tracing::debug!(file = %name.display(), "unstaged addition");
                self.changed = true;
                Ok(false)
            }
            None => Err(RepositoryError::NothingToRemove(name.to_path_buf()).into()),
        }
    }

    /// Apply the pending changes to a parent snapshot
    pub fn apply_to(&self, parent: &Snapshot) -> Snapshot {
        let mut snapshot = parent.clone();

        for (name, oid) in &self.additions {
            snapshot.insert(name.clone(), oid.clone());
        }
        for name in self.removals.keys() {
            snapshot.remove(name);
        }

        snapshot
    }

    /// Drop every pending addition and removal, keeping the branch registry
    pub fn clear_changes(&mut self) {
        if !self.is_empty() {
            self.changed = true;
        }
        self.additions.clear();
        self.removals.clear();
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.contains(name)
    }

    /// Returns false if the branch was already registered
    pub fn register_branch(&mut self, name: &str) -> bool {
        let inserted = self.branches.insert(name.to_string());
        self.changed |= inserted;
        inserted
    }

    /// Returns false if the branch was not registered
    pub fn unregister_branch(&mut self, name: &str) -> bool {
        let removed = self.branches.remove(name);
        self.changed |= removed;
        removed
    }

    fn reset(&mut self) {
        self.additions.clear();
        self.removals.clear();
        self.branches.clear();
        self.changed = false;
    }

    /// Load the staging area from disk
    ///
    /// A missing or empty file leaves the staging area empty.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.reset();

        if !self.path.exists() {
            return Ok(());
        }

        let index_file = std::fs::File::open(&self.path)
            .with_context(|| format!("Unable to open staging area {}", self.path.display()))?;

        if index_file.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(std::io::BufReader::new(index_file));
        let header = IndexHeader::deserialize(reader.read(HEADER_SIZE)?)?;

        self.additions = Self::parse_records(header.additions_count, &mut reader)?;
        self.removals = Self::parse_records(header.removals_count, &mut reader)?;
        for _ in 0..header.branches_count {
            self.branches.insert(Self::parse_name(&mut reader)?);
        }

        reader.verify()?;

        tracing::trace!(
            additions = self.additions.len(),
            removals = self.removals.len(),
            branches = self.branches.len(),
            "loaded staging area"
        );

        Ok(())
    }

    fn parse_records(
        count: u32,
        reader: &mut Checksum<impl Read>,
    ) -> anyhow::Result<BTreeMap<PathBuf, ObjectId>> {
        let mut records = BTreeMap::new();

        for _ in 0..count {
            let raw_oid = reader.read(RAW_OID_SIZE)?;
            let oid = ObjectId::read_h40_from(&mut &raw_oid[..])?;
            let name = Self::parse_name(reader)?;

            records.insert(PathBuf::from(name), oid);
        }

        Ok(records)
    }

    fn parse_name(reader: &mut Checksum<impl Read>) -> anyhow::Result<String> {
        let length = byteorder::NetworkEndian::read_u16(&reader.read(2)?);
        let name = reader.read(length as usize)?;

        String::from_utf8(name.to_vec()).context("Invalid name in staging area")
    }

    /// Persist the whole staging area, replacing the file on disk
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open staging area {}", self.path.display()))?;

        let mut writer = Checksum::new(std::io::BufWriter::new(index_file));

        let header = IndexHeader::with_counts(
            self.additions.len(),
            self.removals.len(),
            self.branches.len(),
        )?;
        writer.write(&header.serialize()?)?;

        for (name, oid) in self.additions.iter().chain(self.removals.iter()) {
            let mut record = Vec::with_capacity(RAW_OID_SIZE);
            oid.write_h40_to(&mut record)?;
            writer.write(&record)?;
            writer.write(&Self::encode_name(&name.to_string_lossy())?)?;
        }
        for branch in &self.branches {
            writer.write(&Self::encode_name(branch)?)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        tracing::trace!(path = %self.path.display(), "wrote staging area");

        Ok(())
    }

    fn encode_name(name: &str) -> anyhow::Result<Vec<u8>> {
        let length = u16::try_from(name.len())
            .with_context(|| format!("Name too long for staging area: {name}"))?;

        let mut bytes = Vec::with_capacity(2 + name.len());
        bytes.write_u16::<byteorder::NetworkEndian>(length)?;
        bytes.write_all(name.as_bytes())?;

        Ok(bytes)
    }
}
