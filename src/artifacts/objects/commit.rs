//! Commit object
//!
//! A commit is an immutable snapshot of every tracked file at one point in time.
//! It contains:
//! - Parent commit ID(s): none for the root commit, one normally, two for a merge
//! - The creation date
//! - The complete mapping from file name to blob ID (not a delta)
//! - The commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <primary-parent-sha>
//! parent <secondary-parent-sha>
//! date <unix-timestamp> <timezone>
//! blob <blob-sha> <file-name>
//! blob <blob-sha> <file-name>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, TimeZone};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Message of the commit every repository starts from
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// Environment variable overriding the date of new commits
pub const COMMIT_DATE_ENV: &str = "BITLET_COMMIT_DATE";

/// Snapshot of tracked files: file name to blob ID
pub type Snapshot = BTreeMap<PathBuf, ObjectId>;

/// Slim representation of a commit
///
/// Only the graph links, which is all the split point search needs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Primary parent first, then the merged-in parent (if any)
    parents: Vec<ObjectId>,
    timestamp: DateTime<FixedOffset>,
    blobs: Snapshot,
    message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        timestamp: DateTime<FixedOffset>,
        blobs: Snapshot,
        message: String,
    ) -> Self {
        Commit {
            parents,
            timestamp,
            blobs,
            message,
        }
    }

    /// The commit every repository starts from
    ///
    /// Its date is the Unix epoch and it tracks nothing, so its ID is the same in
    /// every freshly initialized repository.
    pub fn root() -> Self {
        let epoch = FixedOffset::east_opt(0)
            .and_then(|utc| utc.timestamp_opt(0, 0).single())
            .unwrap_or_default();

        Commit::new(
            Vec::new(),
            epoch,
            Snapshot::new(),
            ROOT_COMMIT_MESSAGE.to_string(),
        )
    }

    /// Date for a new commit
    ///
    /// Reads `BITLET_COMMIT_DATE` in RFC 2822 or `%Y-%m-%d %H:%M:%S %z` form, falling back
    /// to the current local time.
    pub fn timestamp_from_env() -> DateTime<FixedOffset> {
        std::env::var(COMMIT_DATE_ENV)
            .ok()
            .and_then(|date_str| {
                DateTime::parse_from_rfc2822(&date_str)
                    .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                    .ok()
            })
            .unwrap_or_else(|| chrono::Local::now().fixed_offset())
    }

    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.parents.get(1)
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn blobs(&self) -> &Snapshot {
        &self.blobs
    }

    pub fn blob(&self, name: &Path) -> Option<&ObjectId> {
        self.blobs.get(name)
    }

    pub fn tracks(&self, name: &Path) -> bool {
        self.blobs.contains_key(name)
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Date in the form `Thu Jan 1 00:00:00 1970 +0000`
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn to_slim(&self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            oid,
            parents: self.parents.clone(),
        }
    }

    fn header_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.parents.len() + self.blobs.len() + 1);

        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }
        lines.push(format!(
            "date {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for (name, oid) in &self.blobs {
            lines.push(format!("blob {} {}", oid, name.to_string_lossy()));
        }

        lines
    }

    fn parse_date(value: &str) -> anyhow::Result<DateTime<FixedOffset>> {
        let (seconds, timezone) = value
            .split_once(' ')
            .context("Invalid commit object: invalid date line")?;
        let seconds = seconds
            .parse::<i64>()
            .context("Invalid commit object: invalid timestamp")?;
        let offset = DateTime::parse_from_str(&format!("1970-01-01 00:00:00 {timezone}"), "%Y-%m-%d %H:%M:%S %z")
            .context("Invalid commit object: invalid timezone")?
            .offset()
            .to_owned();

        offset
            .timestamp_opt(seconds, 0)
            .single()
            .context("Invalid commit object: timestamp out of range")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let body = format!("{}\n\n{}", self.header_lines().join("\n"), self.message);

        Ok(frame(self.object_type(), body.as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .context("Invalid commit object: body is not UTF-8")?;

        let (header, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;

        let mut parents = Vec::new();
        let mut timestamp = None;
        let mut blobs = Snapshot::new();

        for line in header.lines() {
            let (key, value) = line
                .split_once(' ')
                .with_context(|| format!("Invalid commit object: malformed line '{line}'"))?;

            match key {
                "parent" => parents.push(ObjectId::try_parse(value.to_string())?),
                "date" => timestamp = Some(Self::parse_date(value)?),
                "blob" => {
                    let (oid, name) = value
                        .split_once(' ')
                        .context("Invalid commit object: invalid blob line")?;
                    blobs.insert(PathBuf::from(name), ObjectId::try_parse(oid.to_string())?);
                }
                _ => anyhow::bail!("Invalid commit object: unknown header '{key}'"),
            }
        }

        let timestamp = timestamp.context("Invalid commit object: missing date line")?;

        Ok(Self::new(parents, timestamp, blobs, message.to_string()))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        format!("{}\n\n{}", self.header_lines().join("\n"), self.message)
    }
}
