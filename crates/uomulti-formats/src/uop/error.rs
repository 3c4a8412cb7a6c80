//! Error types for UOP container operations

use thiserror::Error;

/// UOP operation result type
pub type UopResult<T> = Result<T, UopError>;

/// Errors raised while reading or writing UOP containers
#[derive(Debug, Error)]
pub enum UopError {
    /// Signature at offset 0 does not match
    #[error("Invalid UOP signature: 0x{0:08x}")]
    InvalidSignature(u32),

    /// Container version is newer than supported
    #[error("Unsupported UOP version: {found} (maximum {supported})")]
    UnsupportedVersion {
        /// Version found in the header
        found: u32,
        /// Highest supported version
        supported: u32,
    },

    /// Directory entry uses an unknown compression method
    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(i16),

    /// Directory page chain is broken
    #[error("Malformed directory page at offset {offset}: {reason}")]
    MalformedPage {
        /// Offset of the offending page
        offset: u64,
        /// Description of the problem
        reason: String,
    },

    /// Layout configuration cannot produce a valid container
    #[error("Invalid container layout: {0}")]
    InvalidLayout(String),

    /// Decompressed size differs from the directory entry
    #[error("Decompressed size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Size recorded in the directory entry
        expected: u64,
        /// Size actually produced
        actual: u64,
    },

    /// zlib stream could not be encoded or decoded
    #[error("Compression error: {0}")]
    Compression(String),

    /// Every reserved directory slot has been used
    #[error("All {capacity} directory slots are in use")]
    SlotsExhausted {
        /// Number of slots reserved at initialization
        capacity: usize,
    },

    /// Blob does not fit a 32-bit length field
    #[error("Blob of {0} bytes exceeds the 32-bit length field")]
    BlobTooLarge(usize),

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UopError {
    /// Check if this error describes malformed container content
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature(_)
                | Self::UnsupportedVersion { .. }
                | Self::UnsupportedCompression(_)
                | Self::MalformedPage { .. }
                | Self::SizeMismatch { .. }
                | Self::BinRead(_)
        )
    }
}
