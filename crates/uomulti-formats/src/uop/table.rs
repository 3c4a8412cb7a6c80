//! Directory page chain traversal and construction

use super::constants::{ENTRY_SIZE, HEADER_SIZE, PAGE_HEADER_SIZE, TABLE_OFFSET_LOCATION};
use super::entry::{DirectoryEntry, DirectoryPageHeader};
use super::error::{UopError, UopResult};
use super::header::{ContainerHeader, ContainerLayout};
use binrw::{BinRead, BinWrite};
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use tracing::{debug, info};
use uomulti_hash::{IdentifierRegistry, block_checksum_reader};

/// Walk the directory page chain and return every entry slot offset
///
/// Starts at the `first_table_offset` stored at byte 12. Offsets are returned
/// in page order, which is also ascending file order: every page must lie
/// inside the stream and point strictly past its own entries, so corrupt or
/// cyclic chains are rejected instead of looping.
pub fn collect_entry_offsets<R: Read + Seek>(reader: &mut R) -> UopResult<Vec<u64>> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(TABLE_OFFSET_LOCATION))?;
    let mut page_offset = u64::read_le(reader)?;

    let mut offsets = Vec::new();
    while page_offset != 0 {
        if page_offset.saturating_add(PAGE_HEADER_SIZE) > stream_len {
            return Err(UopError::MalformedPage {
                offset: page_offset,
                reason: format!("page header extends past end of stream ({stream_len} bytes)"),
            });
        }

        reader.seek(SeekFrom::Start(page_offset))?;
        let page = DirectoryPageHeader::read(reader)?;

        let entries_start = page_offset + PAGE_HEADER_SIZE;
        let page_end = entries_start + u64::from(page.page_size) * ENTRY_SIZE;
        if page_end > stream_len {
            return Err(UopError::MalformedPage {
                offset: page_offset,
                reason: format!(
                    "{} entries extend past end of stream ({stream_len} bytes)",
                    page.page_size
                ),
            });
        }

        offsets.extend((0..u64::from(page.page_size)).map(|i| entries_start + i * ENTRY_SIZE));

        if page.is_terminal() {
            break;
        }
        if page.next_page_offset < page_end {
            return Err(UopError::MalformedPage {
                offset: page_offset,
                reason: format!(
                    "next page offset {} does not move past page end {page_end}",
                    page.next_page_offset
                ),
            });
        }
        page_offset = page.next_page_offset;
    }

    debug!("Collected {} directory entry offsets", offsets.len());
    Ok(offsets)
}

/// Write a container header and an empty directory for `total_entries` slots
///
/// Pages hold up to `layout.page_capacity` zeroed entries; the last page
/// holds the remainder and terminates the chain. A zero total still writes a
/// single empty page. Returns the absolute offset of every slot, and leaves
/// the writer positioned just past the directory.
pub fn initialize_container<W: Write + Seek>(
    writer: &mut W,
    layout: &ContainerLayout,
    total_entries: u32,
) -> UopResult<Vec<u64>> {
    layout.validate()?;

    writer.seek(SeekFrom::Start(0))?;
    ContainerHeader::new(layout, total_entries).write(writer)?;
    write_zeros(writer, layout.first_table_offset - HEADER_SIZE)?;

    let mut offsets = Vec::with_capacity(total_entries as usize);
    let mut remaining = total_entries;
    let mut page_offset = layout.first_table_offset;
    loop {
        let page_size = remaining.min(layout.page_capacity);
        remaining -= page_size;

        let entries_start = page_offset + PAGE_HEADER_SIZE;
        let page_end = entries_start + u64::from(page_size) * ENTRY_SIZE;
        let page = DirectoryPageHeader {
            page_size,
            next_page_offset: if remaining > 0 { page_end } else { 0 },
        };
        page.write(writer)?;
        write_zeros(writer, page_end - entries_start)?;

        offsets.extend((0..u64::from(page_size)).map(|i| entries_start + i * ENTRY_SIZE));

        if remaining == 0 {
            break;
        }
        page_offset = page_end;
    }

    debug!(
        "Initialized container directory: {} slots in {} pages",
        total_entries,
        layout.page_count(total_entries)
    );
    Ok(offsets)
}

/// Read the entries at `offsets` and key the valid ones by registry id
///
/// Unused slots are skipped. Identifiers unknown to the registry are
/// dropped. Reading stops early once every registry hash has been matched.
pub fn resolve_identifiers<R: Read + Seek>(
    reader: &mut R,
    registry: &IdentifierRegistry,
    offsets: &[u64],
) -> UopResult<BTreeMap<u32, DirectoryEntry>> {
    let mut entries = BTreeMap::new();

    for &offset in offsets {
        if entries.len() >= registry.len() {
            break;
        }

        let entry = read_entry(reader, offset)?;
        if !entry.is_valid() {
            continue;
        }

        match registry.get(entry.identifier) {
            Some(id) => {
                entries.insert(id, entry);
            }
            None => debug!(
                "Skipping unknown identifier {:016x} at offset {}",
                entry.identifier, offset
            ),
        }
    }

    debug!("Resolved {} of {} directory entries", entries.len(), offsets.len());
    Ok(entries)
}

/// Recompute the block checksum of every valid entry in place
///
/// Returns the number of rewritten entries.
pub fn refresh_block_hashes<S: Read + Write + Seek>(
    stream: &mut S,
    layout: &ContainerLayout,
) -> UopResult<usize> {
    ContainerHeader::read_validated(stream, layout)?;
    let offsets = collect_entry_offsets(stream)?;

    let mut rewritten = 0;
    for offset in offsets {
        let mut entry = read_entry(stream, offset)?;
        if !entry.is_valid() {
            continue;
        }

        stream.seek(SeekFrom::Start(entry.data_offset()?))?;
        entry.data_block_hash = block_checksum_reader(stream, u64::from(entry.compressed_length))?;

        write_entry(stream, offset, &entry)?;
        rewritten += 1;
    }

    stream.flush()?;
    info!("Refreshed block hashes for {} entries", rewritten);
    Ok(rewritten)
}

/// Read one entry with a single read of its 34 bytes
fn read_entry<R: Read + Seek>(reader: &mut R, offset: u64) -> UopResult<DirectoryEntry> {
    let mut raw = [0u8; ENTRY_SIZE as usize];
    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(&mut raw)?;
    Ok(DirectoryEntry::read(&mut Cursor::new(&raw[..]))?)
}

/// Write one entry with a single write of its 34 bytes
fn write_entry<W: Write + Seek>(
    writer: &mut W,
    offset: u64,
    entry: &DirectoryEntry,
) -> UopResult<()> {
    let mut raw = Cursor::new([0u8; ENTRY_SIZE as usize]);
    entry.write(&mut raw)?;
    writer.seek(SeekFrom::Start(offset))?;
    writer.write_all(raw.get_ref())?;
    Ok(())
}

fn write_zeros<W: Write>(writer: &mut W, count: u64) -> io::Result<()> {
    io::copy(&mut io::repeat(0).take(count), writer)?;
    Ok(())
}
