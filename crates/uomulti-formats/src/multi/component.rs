//! Single placed component and its binary records

use super::constants::UNSET_TILE_ID;
use super::error::{MultiError, MultiResult};
use binrw::{BinRead, BinWrite};

/// Flag value of a component flagged as foliage/background (code 0)
const FLAG_BACKGROUND: u64 = 1;
/// Flag value of a component with both generic and hued bits (code 256)
const FLAG_GENERIC_HUED: u64 = 0x0000_0001_0000_0001;
/// Flag value of a hued-only component (code 257)
const FLAG_HUED: u64 = 0x0000_0001_0000_0000;

/// One tile placed relative to the multi's origin
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    /// Art tile id
    pub tile_id: u16,
    /// X offset from the origin
    pub offset_x: i16,
    /// Y offset from the origin
    pub offset_y: i16,
    /// Z offset from the origin
    pub offset_z: i16,
    /// Legacy 64-bit flag
    pub flag: u64,
    /// Localization (cliloc) references, modern records only
    pub localization_refs: Vec<u32>,
}

impl Default for Component {
    fn default() -> Self {
        Self {
            tile_id: UNSET_TILE_ID,
            offset_x: 0,
            offset_y: 0,
            offset_z: 0,
            flag: 0,
            localization_refs: Vec::new(),
        }
    }
}

/// Translate a modern 16-bit flag code into the legacy flag value
///
/// Code 0 and every unknown code map to 1.
pub const fn flag_from_code(code: u16) -> u64 {
    match code {
        1 => 0,
        256 => FLAG_GENERIC_HUED,
        257 => FLAG_HUED,
        _ => FLAG_BACKGROUND,
    }
}

/// Translate a legacy flag value into the modern 16-bit flag code
///
/// Values with no dedicated code are written as 1.
pub const fn code_from_flag(flag: u64) -> u16 {
    match flag {
        FLAG_BACKGROUND => 0,
        FLAG_GENERIC_HUED => 256,
        FLAG_HUED => 257,
        _ => 1,
    }
}

/// 16-byte `.mul` record
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub(crate) struct LegacyRecord {
    pub tile_id: u16,
    pub offset_x: i16,
    pub offset_y: i16,
    pub offset_z: i16,
    pub flag: u64,
}

/// Variable-length UOP record
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub(crate) struct ModernRecord {
    pub tile_id: u16,
    pub offset_x: i16,
    pub offset_y: i16,
    pub offset_z: i16,
    pub flag_code: u16,
    pub ref_count: u32,
    #[br(count = ref_count)]
    pub refs: Vec<u32>,
}

/// Header of a UOP multi blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub(crate) struct ModernBlobHeader {
    pub reserved: u32,
    pub entry_count: u32,
}

impl From<LegacyRecord> for Component {
    fn from(record: LegacyRecord) -> Self {
        Self {
            tile_id: record.tile_id,
            offset_x: record.offset_x,
            offset_y: record.offset_y,
            offset_z: record.offset_z,
            flag: record.flag,
            localization_refs: Vec::new(),
        }
    }
}

impl From<ModernRecord> for Component {
    fn from(record: ModernRecord) -> Self {
        Self {
            tile_id: record.tile_id,
            offset_x: record.offset_x,
            offset_y: record.offset_y,
            offset_z: record.offset_z,
            flag: flag_from_code(record.flag_code),
            localization_refs: record.refs,
        }
    }
}

impl Component {
    pub(crate) fn to_legacy_record(&self) -> LegacyRecord {
        LegacyRecord {
            tile_id: self.tile_id,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            offset_z: self.offset_z,
            flag: self.flag,
        }
    }

    pub(crate) fn to_modern_record(&self) -> MultiResult<ModernRecord> {
        let ref_count = u32::try_from(self.localization_refs.len())
            .map_err(|_| MultiError::TooManyReferences(self.localization_refs.len()))?;
        Ok(ModernRecord {
            tile_id: self.tile_id,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            offset_z: self.offset_z,
            flag_code: code_from_flag(self.flag),
            ref_count,
            refs: self.localization_refs.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::multi::constants::{LEGACY_RECORD_SIZE, MODERN_RECORD_BASE_SIZE};
    use std::io::Cursor;

    #[test]
    fn test_default_component() {
        let component = Component::default();
        assert_eq!(component.tile_id, 0xFFFF);
        assert_eq!(component.flag, 0);
        assert!(component.localization_refs.is_empty());
    }

    #[test]
    fn test_flag_decoding() {
        assert_eq!(flag_from_code(0), 1);
        assert_eq!(flag_from_code(1), 0);
        assert_eq!(flag_from_code(256), 0x1_0000_0001);
        assert_eq!(flag_from_code(257), 0x1_0000_0000);
        assert_eq!(flag_from_code(2), 1);
        assert_eq!(flag_from_code(0xFFFF), 1);
    }

    #[test]
    fn test_flag_encoding() {
        assert_eq!(code_from_flag(1), 0);
        assert_eq!(code_from_flag(0), 1);
        assert_eq!(code_from_flag(0x1_0000_0001), 256);
        assert_eq!(code_from_flag(0x1_0000_0000), 257);
        assert_eq!(code_from_flag(0x40), 1);
    }

    #[test]
    fn test_legacy_record_layout() {
        let record = LegacyRecord {
            tile_id: 0x0123,
            offset_x: -1,
            offset_y: 2,
            offset_z: 7,
            flag: 0x1_0000_0000,
        };
        let mut cursor = Cursor::new(Vec::new());
        record.write(&mut cursor).unwrap();
        let bytes = cursor.into_inner();

        assert_eq!(bytes.len(), LEGACY_RECORD_SIZE);
        assert_eq!(&bytes[0..2], &[0x23, 0x01]);
        assert_eq!(&bytes[2..4], &[0xFF, 0xFF]);
        assert_eq!(&bytes[8..16], &[0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_modern_record_layout() {
        let component = Component {
            tile_id: 0x0010,
            offset_x: 3,
            offset_y: -3,
            offset_z: 0,
            flag: 1,
            localization_refs: vec![1_061_999, 1_062_000],
        };
        let mut cursor = Cursor::new(Vec::new());
        component.to_modern_record().unwrap().write(&mut cursor).unwrap();
        let bytes = cursor.into_inner();

        assert_eq!(bytes.len(), MODERN_RECORD_BASE_SIZE + 2 * 4);
        assert_eq!(&bytes[8..10], &0u16.to_le_bytes());
        assert_eq!(&bytes[10..14], &2u32.to_le_bytes());
        assert_eq!(&bytes[14..18], &1_061_999u32.to_le_bytes());

        let parsed = ModernRecord::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(Component::from(parsed), component);
    }

    #[test]
    fn test_legacy_drops_references() {
        let component = Component {
            localization_refs: vec![5],
            ..Component::default()
        };
        let restored = Component::from(component.to_legacy_record());
        assert!(restored.localization_refs.is_empty());
        assert_eq!(restored.tile_id, component.tile_id);
    }
}
