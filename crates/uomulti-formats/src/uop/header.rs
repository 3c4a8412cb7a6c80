//! Container header and layout configuration

use super::constants::{
    DEFAULT_PAGE_CAPACITY, FIRST_TABLE_OFFSET, HEADER_SIZE, RESERVED_MARKER, SIGNATURE,
    TRAILING_RESERVED, VERSION,
};
use super::error::{UopError, UopResult};
use binrw::{BinRead, BinWrite};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Header values written to, and accepted from, containers
///
/// The defaults reproduce the containers shipped with the game client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerLayout {
    /// Expected signature at offset 0
    pub signature: u32,
    /// Highest accepted version, also the version written
    pub version: u32,
    /// Value written at offset 8
    pub reserved_marker: u32,
    /// Where the first directory page is placed
    pub first_table_offset: u64,
    /// Entries per directory page
    pub page_capacity: u32,
    /// Values written after the entry count
    pub trailing_reserved: [u32; 3],
}

impl Default for ContainerLayout {
    fn default() -> Self {
        Self {
            signature: SIGNATURE,
            version: VERSION,
            reserved_marker: RESERVED_MARKER,
            first_table_offset: FIRST_TABLE_OFFSET,
            page_capacity: DEFAULT_PAGE_CAPACITY,
            trailing_reserved: TRAILING_RESERVED,
        }
    }
}

impl ContainerLayout {
    /// Set the entries per directory page
    pub fn with_page_capacity(mut self, page_capacity: u32) -> Self {
        self.page_capacity = page_capacity;
        self
    }

    /// Set the offset of the first directory page
    pub fn with_first_table_offset(mut self, offset: u64) -> Self {
        self.first_table_offset = offset;
        self
    }

    /// Check that containers can be written with this layout
    pub fn validate(&self) -> UopResult<()> {
        if self.page_capacity == 0 {
            return Err(UopError::InvalidLayout(
                "page capacity must be at least 1".to_string(),
            ));
        }
        if self.first_table_offset < HEADER_SIZE {
            return Err(UopError::InvalidLayout(format!(
                "first table offset {} overlaps the {HEADER_SIZE}-byte header",
                self.first_table_offset
            )));
        }
        Ok(())
    }

    /// Number of directory pages needed for `total_entries` slots
    ///
    /// Always at least one, so an empty container still has a terminal page.
    pub fn page_count(&self, total_entries: u32) -> u32 {
        total_entries.div_ceil(self.page_capacity.max(1)).max(1)
    }
}

/// Fixed 40-byte container header
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ContainerHeader {
    /// Container signature
    pub signature: u32,
    /// Format version
    pub version: u32,
    /// Opaque value, preserved as-is
    pub reserved: u32,
    /// Offset of the first directory page
    pub first_table_offset: u64,
    /// Entries per directory page
    pub page_capacity: u32,
    /// Total entry slots across all pages
    pub total_entries: u32,
    /// Trailing reserved values
    pub trailing_reserved: [u32; 3],
}

impl ContainerHeader {
    /// Build the header for a new container with `total_entries` slots
    pub fn new(layout: &ContainerLayout, total_entries: u32) -> Self {
        Self {
            signature: layout.signature,
            version: layout.version,
            reserved: layout.reserved_marker,
            first_table_offset: layout.first_table_offset,
            page_capacity: layout.page_capacity,
            total_entries,
            trailing_reserved: layout.trailing_reserved,
        }
    }

    /// Read the header at offset 0, rejecting foreign or newer containers
    ///
    /// Signature and version are checked before the rest of the header is
    /// read, so short foreign files are reported as a bad signature.
    pub fn read_validated<R: Read + Seek>(
        reader: &mut R,
        layout: &ContainerLayout,
    ) -> UopResult<Self> {
        reader.seek(SeekFrom::Start(0))?;

        let mut prefix = [0u8; 8];
        let filled = read_prefix(reader, &mut prefix)?;
        let signature = (filled >= 4)
            .then(|| u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]));
        match signature {
            Some(signature) if signature == layout.signature => {}
            Some(signature) => return Err(UopError::InvalidSignature(signature)),
            None => {
                let mut partial = [0u8; 4];
                partial[..filled].copy_from_slice(&prefix[..filled]);
                return Err(UopError::InvalidSignature(u32::from_le_bytes(partial)));
            }
        }
        if filled == prefix.len() {
            let version = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);
            if version > layout.version {
                return Err(UopError::UnsupportedVersion {
                    found: version,
                    supported: layout.version,
                });
            }
        }

        reader.seek(SeekFrom::Start(0))?;
        let header = Self::read(reader)?;
        header.validate(layout)?;
        Ok(header)
    }

    /// Check signature and version against a layout
    pub fn validate(&self, layout: &ContainerLayout) -> UopResult<()> {
        if self.signature != layout.signature {
            return Err(UopError::InvalidSignature(self.signature));
        }
        if self.version > layout.version {
            return Err(UopError::UnsupportedVersion {
                found: self.version,
                supported: layout.version,
            });
        }
        Ok(())
    }
}

/// Fill `buf` from the reader, stopping early at end of stream
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> UopResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(UopError::Io(e)),
        }
    }
    Ok(filled)
}

/// Check whether a stream starts with a supported container header
///
/// Only the signature and version are inspected. Streams shorter than eight
/// bytes are reported as not valid. The stream position is restored.
pub fn is_valid_container<R: Read + Seek>(
    reader: &mut R,
    layout: &ContainerLayout,
) -> UopResult<bool> {
    let position = reader.stream_position()?;
    reader.seek(SeekFrom::Start(0))?;

    let mut prefix = [0u8; 8];
    let outcome = match reader.read_exact(&mut prefix) {
        Ok(()) => {
            let signature = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
            let version = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);
            Ok(signature == layout.signature && version <= layout.version)
        }
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(UopError::Io(e)),
    };

    reader.seek(SeekFrom::Start(position))?;
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_bytes(signature: u32, version: u32) -> Vec<u8> {
        let mut header = ContainerHeader::new(&ContainerLayout::default(), 3);
        header.signature = signature;
        header.version = version;
        let mut cursor = Cursor::new(Vec::new());
        header.write(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_header_layout() {
        let bytes = header_bytes(SIGNATURE, VERSION);
        assert_eq!(bytes.len() as u64, HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"MYP\0");
        assert_eq!(&bytes[4..8], &5u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &RESERVED_MARKER.to_le_bytes());
        assert_eq!(&bytes[12..20], &512u64.to_le_bytes());
        assert_eq!(&bytes[20..24], &1000u32.to_le_bytes());
        assert_eq!(&bytes[24..28], &3u32.to_le_bytes());
        assert_eq!(&bytes[28..40], &[1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_validated() {
        let layout = ContainerLayout::default();

        let mut good = Cursor::new(header_bytes(SIGNATURE, 4));
        let header = ContainerHeader::read_validated(&mut good, &layout).unwrap();
        assert_eq!(header.version, 4);
        assert_eq!(header.total_entries, 3);

        let mut foreign = Cursor::new(header_bytes(0x1234_5678, VERSION));
        assert!(matches!(
            ContainerHeader::read_validated(&mut foreign, &layout),
            Err(UopError::InvalidSignature(0x1234_5678))
        ));

        let mut newer = Cursor::new(header_bytes(SIGNATURE, 6));
        assert!(matches!(
            ContainerHeader::read_validated(&mut newer, &layout),
            Err(UopError::UnsupportedVersion {
                found: 6,
                supported: 5
            })
        ));
    }

    #[test]
    fn test_read_validated_short_streams() {
        let layout = ContainerLayout::default();

        let mut foreign = Cursor::new(b"not a uop".to_vec());
        assert!(matches!(
            ContainerHeader::read_validated(&mut foreign, &layout),
            Err(UopError::InvalidSignature(0x2074_6F6E))
        ));

        let mut tiny = Cursor::new(vec![0x4D, 0x59]);
        assert!(matches!(
            ContainerHeader::read_validated(&mut tiny, &layout),
            Err(UopError::InvalidSignature(0x594D))
        ));

        let mut newer = Cursor::new(header_bytes(SIGNATURE, 6)[..8].to_vec());
        assert!(matches!(
            ContainerHeader::read_validated(&mut newer, &layout),
            Err(UopError::UnsupportedVersion { found: 6, .. })
        ));

        // Valid prefix, truncated header
        let mut truncated = Cursor::new(header_bytes(SIGNATURE, VERSION)[..20].to_vec());
        assert!(matches!(
            ContainerHeader::read_validated(&mut truncated, &layout),
            Err(UopError::BinRead(_))
        ));
    }

    #[test]
    fn test_is_valid_container_restores_position() {
        let layout = ContainerLayout::default();
        let mut cursor = Cursor::new(header_bytes(SIGNATURE, VERSION));
        cursor.set_position(17);

        assert!(is_valid_container(&mut cursor, &layout).unwrap());
        assert_eq!(cursor.position(), 17);

        let mut newer = Cursor::new(header_bytes(SIGNATURE, 6));
        assert!(!is_valid_container(&mut newer, &layout).unwrap());
    }

    #[test]
    fn test_short_stream_is_not_valid() {
        let layout = ContainerLayout::default();
        let mut short = Cursor::new(vec![0x4D, 0x59, 0x50, 0x00, 0x05]);
        assert!(!is_valid_container(&mut short, &layout).unwrap());

        let mut empty = Cursor::new(Vec::new());
        assert!(!is_valid_container(&mut empty, &layout).unwrap());
    }

    #[test]
    fn test_layout_validation() {
        assert!(ContainerLayout::default().validate().is_ok());
        assert!(matches!(
            ContainerLayout::default().with_page_capacity(0).validate(),
            Err(UopError::InvalidLayout(_))
        ));
        assert!(matches!(
            ContainerLayout::default()
                .with_first_table_offset(20)
                .validate(),
            Err(UopError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_page_count() {
        let layout = ContainerLayout::default();
        assert_eq!(layout.page_count(0), 1);
        assert_eq!(layout.page_count(1), 1);
        assert_eq!(layout.page_count(1000), 1);
        assert_eq!(layout.page_count(1001), 2);
        assert_eq!(layout.page_count(2500), 3);
    }

    #[test]
    fn test_layout_serde_defaults() {
        let layout: ContainerLayout = serde_json::from_str(r#"{"page_capacity": 10}"#).unwrap();
        assert_eq!(layout.page_capacity, 10);
        assert_eq!(layout.signature, SIGNATURE);
        assert_eq!(layout.first_table_offset, FIRST_TABLE_OFFSET);
    }
}
