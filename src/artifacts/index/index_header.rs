use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use anyhow::anyhow;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) additions_count: u32,
    pub(crate) removals_count: u32,
    pub(crate) branches_count: u32,
}

impl IndexHeader {
    pub(crate) fn with_counts(additions: usize, removals: usize, branches: usize) -> anyhow::Result<Self> {
        Ok(IndexHeader {
            marker: String::from(SIGNATURE),
            version: VERSION,
            additions_count: u32::try_from(additions)?,
            removals_count: u32::try_from(removals)?,
            branches_count: u32::try_from(branches)?,
        })
    }

    pub(crate) fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.additions_count)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.removals_count)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.branches_count)?;

        Ok(Bytes::from(bytes))
    }

    pub(crate) fn deserialize(bytes: Bytes) -> anyhow::Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(anyhow!("Invalid header size"));
        }

        let marker = String::from_utf8(bytes[0..4].to_vec())
            .map_err(|_| anyhow!("Invalid marker in staging area header"))?;
        if marker != SIGNATURE {
            return Err(anyhow!("Invalid signature: expected {SIGNATURE}, found {marker}"));
        }

        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        if version != VERSION {
            return Err(anyhow!("Unsupported staging area version: {version}"));
        }

        Ok(IndexHeader {
            marker,
            version,
            additions_count: byteorder::NetworkEndian::read_u32(&bytes[8..12]),
            removals_count: byteorder::NetworkEndian::read_u32(&bytes[12..16]),
            branches_count: byteorder::NetworkEndian::read_u32(&bytes[16..20]),
        })
    }
}
