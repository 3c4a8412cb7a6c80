//! Storage for Ultima Online multi collections.
//!
//! Multi collections ship in two container variants:
//!
//! - **Legacy**: `multi.idx` (12-byte `offset, length, reserved` records, the
//!   record position is the id) plus `multi.mul` (raw blob concatenation)
//! - **Modern**: a single `MultiCollection.uop` container whose directory is
//!   keyed by the hash of `build/multicollection/%.6u.bin`, plus one extra
//!   `housing.bin` blob
//!
//! [`MultiStorage`] opens either variant behind one id-indexed interface,
//! decodes blobs into [`Collection`](uomulti_formats::multi::Collection)s,
//! and writes either variant back out. The `source` module builds containers
//! from directories of text sources and exports them again.
//!
//! # Example
//!
//! ```rust,no_run
//! use uomulti_storage::{MultiStorage, StorageConfig};
//!
//! # fn example() -> uomulti_storage::Result<()> {
//! let config = StorageConfig::default();
//! let mut storage = MultiStorage::open_modern("MultiCollection.uop", &config)?;
//!
//! let castle = storage.read(0x7E)?;
//! println!("{} components", castle.len());
//!
//! // Convert to the legacy pair
//! storage.save("multi.mul", Some("multi.idx".as_ref()), &[])?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

use std::path::PathBuf;
use thiserror::Error;

// Configuration
pub mod config;

// Legacy index records
pub mod legacy;

// Storage facade
pub mod storage;

// Text source discovery and export
pub mod source;

pub use config::StorageConfig;
pub use legacy::IndexRecord;
pub use source::{
    BuildSummary, ExportSummary, build_legacy, build_modern, discover_sources, read_source,
};
pub use storage::{ContainerKind, MultiStorage, write_legacy, write_modern};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container table error.
    #[error("Container error: {0}")]
    Uop(#[from] uomulti_formats::uop::UopError),

    /// Blob payload error.
    #[error("Multi data error: {0}")]
    Multi(#[from] uomulti_formats::multi::MultiError),

    /// Invalid name template.
    #[error("Name template error: {0}")]
    Hash(#[from] uomulti_hash::HashError),

    /// Binary record error.
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required file, blob or source is absent.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Operation needs at least one indexed entry.
    #[error("Container index is empty")]
    EmptyIndex,

    /// Housing data only exists in modern containers.
    #[error("Housing data is not available in legacy containers")]
    HousingUnavailable,

    /// A source file name does not describe an id.
    #[error("Invalid source file {}: {reason}", path.display())]
    InvalidSource {
        /// Offending path
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },
}

impl StorageError {
    /// Create a missing-data error for a path
    pub(crate) fn missing_file(path: &std::path::Path) -> Self {
        Self::MissingData(format!("{} does not exist", path.display()))
    }
}
