//! Sequential container writer

use super::compression::CompressionKind;
use super::entry::DirectoryEntry;
use super::error::{UopError, UopResult};
use super::header::ContainerLayout;
use super::table::initialize_container;
use binrw::BinWrite;
use std::io::{Seek, SeekFrom, Write};
use uomulti_hash::block_checksum;

/// Writer for a new UOP container
///
/// The directory is reserved up front for a fixed number of slots. Each
/// appended blob is written after the directory and its slot is backpatched
/// with the resulting [`DirectoryEntry`].
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use uomulti_formats::uop::{CompressionKind, ContainerLayout, ContainerWriter};
///
/// let mut writer = ContainerWriter::create(Cursor::new(Vec::new()), &ContainerLayout::default(), 2)?;
/// let entry = writer.append(0x1234, b"first blob", CompressionKind::Stored)?;
/// assert_eq!(entry.offset, 512 + 12 + 2 * 34);
/// assert_eq!(writer.remaining_slots(), 1);
/// # Ok::<(), uomulti_formats::uop::UopError>(())
/// ```
pub struct ContainerWriter<W: Write + Seek> {
    /// Underlying writer
    writer: W,
    /// Absolute offsets of the reserved directory slots
    slots: Vec<u64>,
    /// Index of the next unused slot
    next_slot: usize,
    /// Where the next blob will be written
    data_position: u64,
    /// Entries written so far
    entries: Vec<DirectoryEntry>,
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Write the header and an empty directory with `total_slots` slots
    pub fn create(mut writer: W, layout: &ContainerLayout, total_slots: u32) -> UopResult<Self> {
        let slots = initialize_container(&mut writer, layout, total_slots)?;
        let data_position = writer.stream_position()?;
        Ok(Self {
            writer,
            slots,
            next_slot: 0,
            data_position,
            entries: Vec::new(),
        })
    }

    /// Append a blob and fill the next directory slot
    ///
    /// The blob is compressed with `compression` before writing, and its
    /// block checksum is computed over the stored bytes.
    pub fn append(
        &mut self,
        identifier: u64,
        data: &[u8],
        compression: CompressionKind,
    ) -> UopResult<DirectoryEntry> {
        let slot = *self
            .slots
            .get(self.next_slot)
            .ok_or(UopError::SlotsExhausted {
                capacity: self.slots.len(),
            })?;

        let decompressed_length =
            u32::try_from(data.len()).map_err(|_| UopError::BlobTooLarge(data.len()))?;
        let stored = compression.compress(data)?;
        let compressed_length =
            u32::try_from(stored.len()).map_err(|_| UopError::BlobTooLarge(stored.len()))?;

        let entry = DirectoryEntry {
            offset: self.data_position,
            header_length: 0,
            compressed_length,
            decompressed_length,
            identifier,
            data_block_hash: block_checksum(&stored),
            compression: compression.as_raw(),
        };

        self.writer.seek(SeekFrom::Start(self.data_position))?;
        self.writer.write_all(&stored)?;
        self.data_position += u64::from(compressed_length);

        self.writer.seek(SeekFrom::Start(slot))?;
        entry.write(&mut self.writer)?;
        self.writer.seek(SeekFrom::Start(self.data_position))?;

        self.next_slot += 1;
        self.entries.push(entry);
        Ok(entry)
    }

    /// Number of directory slots still unused
    pub fn remaining_slots(&self) -> usize {
        self.slots.len() - self.next_slot
    }

    /// Offset where the next blob will be written
    pub fn position(&self) -> u64 {
        self.data_position
    }

    /// Entries written so far
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Flush and return the underlying writer
    ///
    /// Unused slots stay zeroed and are skipped by readers.
    pub fn finish(mut self) -> UopResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
