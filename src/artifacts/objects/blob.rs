//! Blob object
//!
//! A blob stores the content of one tracked file. Unlike git, the file name is part of
//! the blob body, so the same bytes tracked under two names are two distinct objects.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<name>\0<content>`

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// File content as tracked under one logical file name
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    /// Logical file name, relative to the work tree
    name: PathBuf,
    /// Raw file content
    content: Bytes,
}

impl Blob {
    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let name = self.name.to_string_lossy();
        let mut body = Vec::with_capacity(name.len() + 1 + self.content.len());
        body.extend_from_slice(name.as_bytes());
        body.push(b'\0');
        body.extend_from_slice(&self.content);

        Ok(frame(self.object_type(), &body))
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut name = Vec::new();
        reader.read_until(b'\0', &mut name)?;
        if name.pop() != Some(b'\0') {
            anyhow::bail!("Invalid blob object: missing name terminator");
        }
        let name = String::from_utf8(name).context("Invalid blob object: name is not UTF-8")?;

        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;

        Ok(Self::new(PathBuf::from(name), Bytes::from(content)))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}
