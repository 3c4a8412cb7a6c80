//! UOP container directory format
//!
//! A UOP file is a single container holding many blobs. Blobs are located
//! through a chain of directory pages rather than a fixed table, so a
//! container can grow without relocating earlier pages.
//!
//! # Binary Layout
//!
//! All integers are little-endian.
//!
//! ```text
//! offset 0:  u32 signature            (0x0050594D, "MYP\0")
//! offset 4:  u32 version              (<= 5)
//! offset 8:  u32 reserved             (0xFD23EC43 when written by us)
//! offset 12: u64 first_table_offset
//! offset 20: u32 page_capacity
//! offset 24: u32 total_entry_count
//! offset 28: u32, u32, u32 reserved
//! ... zero padding to first_table_offset ...
//! [DirectoryPage]+ interleaved with blob bytes
//! ```
//!
//! Each directory page is a 12-byte page header (`page_size: u32`,
//! `next_page_offset: u64`) followed by `page_size` 34-byte
//! [`DirectoryEntry`] records. A `next_page_offset` of zero ends the chain.
//!
//! Entries carry a 64-bit identifier (the hash of the entry's name, see
//! `uomulti_hash::identifier_hash`) instead of a numeric id. Readers recover
//! ids by matching identifiers against an
//! [`IdentifierRegistry`](uomulti_hash::IdentifierRegistry).
//!
//! # Usage Examples
//!
//! ## Write and read back a container
//!
//! ```rust
//! use std::io::Cursor;
//! use uomulti_formats::uop::{
//!     CompressionKind, ContainerLayout, ContainerWriter, collect_entry_offsets,
//!     resolve_identifiers,
//! };
//! use uomulti_hash::{IdentifierRegistry, identifier_hash};
//!
//! let layout = ContainerLayout::default();
//! let mut writer = ContainerWriter::create(Cursor::new(Vec::new()), &layout, 1)?;
//! writer.append(identifier_hash("entry/7"), b"payload", CompressionKind::Zlib)?;
//! let mut container = writer.finish()?;
//!
//! let mut registry = IdentifierRegistry::new();
//! registry.insert(identifier_hash("entry/7"), 7);
//!
//! let offsets = collect_entry_offsets(&mut container)?;
//! let entries = resolve_identifiers(&mut container, &registry, &offsets)?;
//! assert_eq!(entries[&7].decompressed_length, 7);
//! # Ok::<(), uomulti_formats::uop::UopError>(())
//! ```

mod compression;
mod entry;
mod error;
mod header;
mod table;
mod writer;

pub use compression::CompressionKind;
pub use entry::{DirectoryEntry, DirectoryPageHeader};
pub use error::{UopError, UopResult};
pub use header::{ContainerHeader, ContainerLayout, is_valid_container};
pub use table::{
    collect_entry_offsets, initialize_container, refresh_block_hashes, resolve_identifiers,
};
pub use writer::ContainerWriter;

/// UOP format constants
pub mod constants {
    /// Container signature (`"MYP\0"` read as a little-endian u32)
    pub const SIGNATURE: u32 = 0x0050_594D;

    /// Highest container version understood, and the version written
    pub const VERSION: u32 = 5;

    /// Opaque value written at offset 8 by the reference tooling
    pub const RESERVED_MARKER: u32 = 0xFD23_EC43;

    /// Location of the `first_table_offset` header field
    pub const TABLE_OFFSET_LOCATION: u64 = 12;

    /// Where newly written containers place their first directory page
    pub const FIRST_TABLE_OFFSET: u64 = 512;

    /// Entries per directory page for newly written containers
    pub const DEFAULT_PAGE_CAPACITY: u32 = 1000;

    /// Trailing reserved header values copied from reference containers
    pub const TRAILING_RESERVED: [u32; 3] = [1, 1, 0];

    /// Size of the fixed container header in bytes
    pub const HEADER_SIZE: u64 = 40;

    /// Size of a directory page header (`page_size` + `next_page_offset`)
    pub const PAGE_HEADER_SIZE: u64 = 12;

    /// Size of one directory entry in bytes
    pub const ENTRY_SIZE: u64 = 34;
}
