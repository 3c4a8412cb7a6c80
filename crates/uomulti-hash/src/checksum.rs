//! Block checksum for stored blob bytes
//!
//! Directory entries carry a checksum of the bytes exactly as stored (after
//! compression). The algorithm is Adler-32: two accumulators modulo 65521,
//! combined as `(b << 16) | a`.

use std::io::{self, Read};

const MODULUS: u32 = 65521;

/// Incremental block checksum state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChecksum {
    a: u32,
    b: u32,
}

impl Default for BlockChecksum {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockChecksum {
    /// Create a fresh checksum state
    pub const fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Feed more bytes into the checksum
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.a = (self.a + u32::from(byte)) % MODULUS;
            self.b = (self.b + self.a) % MODULUS;
        }
    }

    /// Current checksum value
    pub const fn value(&self) -> u32 {
        (self.b << 16) | self.a
    }
}

/// Compute the block checksum of an in-memory buffer.
///
/// ```
/// use uomulti_hash::block_checksum;
///
/// assert_eq!(block_checksum(b""), 1);
/// assert_eq!(block_checksum(b"Wikipedia"), 0x11E6_0398);
/// ```
pub fn block_checksum(data: &[u8]) -> u32 {
    let mut checksum = BlockChecksum::new();
    checksum.update(data);
    checksum.value()
}

/// Compute the block checksum of the next `count` bytes of a reader.
///
/// Fails with [`io::ErrorKind::UnexpectedEof`] if the reader ends early.
pub fn block_checksum_reader<R: Read>(reader: &mut R, count: u64) -> io::Result<u32> {
    let mut checksum = BlockChecksum::new();
    let mut remaining = count;
    let mut buffer = [0u8; 8192];

    while remaining > 0 {
        let want = usize::try_from(remaining).map_or(buffer.len(), |r| r.min(buffer.len()));
        let read = reader.read(&mut buffer[..want])?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("checksum source ended with {remaining} bytes outstanding"),
            ));
        }
        checksum.update(&buffer[..read]);
        remaining -= read as u64;
    }

    Ok(checksum.value())
}
