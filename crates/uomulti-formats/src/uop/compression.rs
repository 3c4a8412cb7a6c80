//! Blob compression methods

use super::error::{UopError, UopResult};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

/// Compression method recorded in a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionKind {
    /// Bytes are stored as-is (`0`)
    #[default]
    Stored,
    /// Bytes are a zlib stream (`1`)
    Zlib,
}

impl CompressionKind {
    /// Raw value stored in the directory entry
    pub const fn as_raw(self) -> i16 {
        match self {
            Self::Stored => 0,
            Self::Zlib => 1,
        }
    }

    /// Encode a blob with this method
    pub fn compress(self, data: &[u8]) -> UopResult<Vec<u8>> {
        match self {
            Self::Stored => Ok(data.to_vec()),
            Self::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data).map_err(|e| {
                    UopError::Compression(format!("zlib compression failed: {e}"))
                })?;
                encoder
                    .finish()
                    .map_err(|e| UopError::Compression(format!("zlib compression failed: {e}")))
            }
        }
    }

    /// Decode a stored blob.
    ///
    /// For zlib blobs the output must be exactly `expected_len` bytes. Stored
    /// blobs are returned unchanged.
    pub fn decompress(self, data: &[u8], expected_len: usize) -> UopResult<Vec<u8>> {
        match self {
            Self::Stored => Ok(data.to_vec()),
            Self::Zlib => {
                // Read one byte past the expected size so oversized streams are caught
                let limit = expected_len as u64 + 1;
                let mut decompressed = Vec::with_capacity(expected_len);
                ZlibDecoder::new(data)
                    .take(limit)
                    .read_to_end(&mut decompressed)
                    .map_err(|e| {
                        UopError::Compression(format!("zlib decompression failed: {e}"))
                    })?;

                if decompressed.len() != expected_len {
                    return Err(UopError::SizeMismatch {
                        expected: expected_len as u64,
                        actual: decompressed.len() as u64,
                    });
                }

                Ok(decompressed)
            }
        }
    }
}

impl TryFrom<i16> for CompressionKind {
    type Error = UopError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stored),
            1 => Ok(Self::Zlib),
            other => Err(UopError::UnsupportedCompression(other)),
        }
    }
}
