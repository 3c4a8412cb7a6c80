//! Legacy `.idx` index records

use crate::Result;
use binrw::{BinRead, BinWrite};
use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::debug;
use uomulti_formats::uop::DirectoryEntry;

/// Size of one index record
pub const INDEX_RECORD_SIZE: u64 = 12;

/// Offset value marking an id with no data
pub const MISSING_OFFSET: u32 = 0xFFFF_FFFE;

/// One 12-byte `.idx` record; its position in the file is the id
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct IndexRecord {
    /// Offset of the blob in the data file
    pub offset: u32,
    /// Length of the blob
    pub length: u32,
    /// Unused
    pub reserved: u32,
}

impl IndexRecord {
    /// Record written for ids without data
    pub const MISSING: Self = Self {
        offset: MISSING_OFFSET,
        length: 0,
        reserved: 0,
    };

    /// Whether the record points at data
    pub const fn is_valid(&self) -> bool {
        self.offset < MISSING_OFFSET && self.length > 0
    }

    /// Describe the record as an uncompressed directory entry
    pub fn to_entry(&self) -> DirectoryEntry {
        DirectoryEntry {
            offset: u64::from(self.offset),
            compressed_length: self.length,
            decompressed_length: self.length,
            ..DirectoryEntry::default()
        }
    }
}

/// Read every valid record of an index, keyed by id
///
/// A trailing partial record is ignored.
pub fn read_index<R: Read + Seek>(reader: &mut R) -> Result<BTreeMap<u32, DirectoryEntry>> {
    let length = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let count = length / INDEX_RECORD_SIZE;
    let mut entries = BTreeMap::new();
    for id in 0..count {
        let record = IndexRecord::read(reader)?;
        if record.is_valid() {
            entries.insert(id as u32, record.to_entry());
        }
    }

    debug!("Read {} valid of {} index records", entries.len(), count);
    Ok(entries)
}

/// Write index records in id order
pub fn write_index<W: Write + Seek>(writer: &mut W, records: &[IndexRecord]) -> Result<()> {
    for record in records {
        record.write(writer)?;
    }
    writer.flush()?;
    Ok(())
}
