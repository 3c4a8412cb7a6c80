//! Multi collection payload codec
//!
//! A multi is a list of placed components (tiles with an offset from the
//! multi's origin). The same list is stored in three forms:
//!
//! - **Legacy** (`multi.mul`): concatenated 16-byte records with a raw 64-bit
//!   flag
//! - **Modern** (UOP blob): an 8-byte header (`reserved = 0`,
//!   `entry_count`) followed by variable-length records with a 16-bit flag
//!   code and a list of localization references
//! - **Text**: one comma-separated line per component, used for editing
//!
//! # Record Layouts
//!
//! ```text
//! legacy: u16 tile_id, i16 x, i16 y, i16 z, u64 flag
//! modern: u16 tile_id, i16 x, i16 y, i16 z, u16 flag_code,
//!         u32 ref_count, u32 refs[ref_count]
//! ```
//!
//! The legacy form cannot hold localization references; they are dropped
//! when encoding legacy records.
//!
//! # Example
//!
//! ```rust
//! use uomulti_formats::multi::{Collection, RecordFormat};
//!
//! let collection = Collection::from_text("0x0001,0,0,0,0x1,\n0x0002,1,-1,5,0x0,1061999:");
//! assert_eq!(collection.len(), 2);
//!
//! let blob = collection.encode(RecordFormat::Modern)?;
//! assert_eq!(Collection::decode(&blob, RecordFormat::Modern)?, collection);
//! # Ok::<(), uomulti_formats::multi::MultiError>(())
//! ```

mod collection;
mod component;
mod error;
mod text;

pub use collection::Collection;
pub use component::{Component, code_from_flag, flag_from_code};
pub use error::{MultiError, MultiResult};
pub use text::TEXT_HEADER;

/// Binary record layout used inside a blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFormat {
    /// Fixed 16-byte records with a raw flag (`.mul` data)
    Legacy,
    /// Counted records with flag code and references (UOP blobs)
    Modern,
}

impl RecordFormat {
    /// Short name for logging
    pub const fn name(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Modern => "modern",
        }
    }
}

/// Multi record constants
pub mod constants {
    /// Size of one legacy record
    pub const LEGACY_RECORD_SIZE: usize = 16;

    /// Size of a modern record without references
    pub const MODERN_RECORD_BASE_SIZE: usize = 14;

    /// Size of the modern blob header (`reserved` + `entry_count`)
    pub const MODERN_BLOB_HEADER_SIZE: usize = 8;

    /// Tile id of a component that was never assigned one
    pub const UNSET_TILE_ID: u16 = 0xFFFF;
}
