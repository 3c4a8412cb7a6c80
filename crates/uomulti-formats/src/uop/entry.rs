//! Directory entry and page header records

use super::compression::CompressionKind;
use super::error::{UopError, UopResult};
use binrw::{BinRead, BinWrite};
use std::fmt;
use std::ops::Range;

/// One 34-byte directory entry
///
/// Describes where a blob lives and how it is stored. Unused slots are all
/// zero; see [`DirectoryEntry::is_valid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, BinRead, BinWrite)]
#[brw(little)]
pub struct DirectoryEntry {
    /// Absolute offset of the blob (before its header)
    pub offset: u64,
    /// Bytes to skip after `offset` before blob data starts
    pub header_length: u32,
    /// Stored size of the blob
    pub compressed_length: u32,
    /// Size after decompression
    pub decompressed_length: u32,
    /// Hash of the entry's name (zero in legacy containers)
    pub identifier: u64,
    /// Block checksum of the stored bytes
    pub data_block_hash: u32,
    /// 0 = stored, 1 = zlib
    pub compression: i16,
}

impl DirectoryEntry {
    /// Whether this slot describes a blob
    pub const fn is_valid(&self) -> bool {
        self.identifier != 0 && self.decompressed_length != 0
    }

    /// Absolute offset of the first stored byte
    ///
    /// Entries whose offset and header length overflow are malformed.
    pub fn data_offset(&self) -> UopResult<u64> {
        self.offset
            .checked_add(u64::from(self.header_length))
            .ok_or_else(|| self.overflow("header length"))
    }

    /// Byte range of the stored blob data
    pub fn data_range(&self) -> UopResult<Range<u64>> {
        let start = self.data_offset()?;
        let end = start
            .checked_add(u64::from(self.compressed_length))
            .ok_or_else(|| self.overflow("compressed length"))?;
        Ok(start..end)
    }

    fn overflow(&self, field: &str) -> UopError {
        UopError::MalformedPage {
            offset: self.offset,
            reason: format!("entry {field} overflows the blob offset"),
        }
    }

    /// Typed compression method
    pub fn compression_kind(&self) -> UopResult<CompressionKind> {
        CompressionKind::try_from(self.compression)
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "identifier={:016x} offset={} header_length={} compressed_length={} \
             decompressed_length={} compression={} data_block_hash={:08x}",
            self.identifier,
            self.offset,
            self.header_length,
            self.compressed_length,
            self.decompressed_length,
            self.compression,
            self.data_block_hash
        )
    }
}

/// Header preceding the entries of one directory page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct DirectoryPageHeader {
    /// Number of entries in this page
    pub page_size: u32,
    /// Offset of the next page, zero for the last page
    pub next_page_offset: u64,
}

impl DirectoryPageHeader {
    /// Whether this is the last page of the chain
    pub const fn is_terminal(&self) -> bool {
        self.next_page_offset == 0
    }
}
