//! Ordered component list and its blob codec

use super::RecordFormat;
use super::component::{Component, LegacyRecord, ModernBlobHeader, ModernRecord};
use super::constants::{LEGACY_RECORD_SIZE, MODERN_BLOB_HEADER_SIZE, MODERN_RECORD_BASE_SIZE};
use super::error::{MultiError, MultiResult};
use binrw::{BinRead, BinWrite};
use std::io::Cursor;

/// Components of one multi, in stored order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    components: Vec<Component>,
}

impl Collection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a blob
    ///
    /// Legacy blobs hold `len / 16` records and trailing bytes are ignored.
    /// Modern blobs must contain every record their header announces.
    pub fn decode(data: &[u8], format: RecordFormat) -> MultiResult<Self> {
        let mut cursor = Cursor::new(data);
        let components = match format {
            RecordFormat::Legacy => {
                let count = data.len() / LEGACY_RECORD_SIZE;
                let mut components = Vec::with_capacity(count);
                for _ in 0..count {
                    components.push(Component::from(LegacyRecord::read(&mut cursor)?));
                }
                components
            }
            RecordFormat::Modern => {
                let header = ModernBlobHeader::read(&mut cursor)?;
                let count = header.entry_count as usize;
                // A corrupt count must not drive the allocation
                let plausible = data.len().saturating_sub(MODERN_BLOB_HEADER_SIZE)
                    / MODERN_RECORD_BASE_SIZE;
                let mut components = Vec::with_capacity(count.min(plausible));
                for _ in 0..count {
                    components.push(Component::from(ModernRecord::read(&mut cursor)?));
                }
                components
            }
        };
        Ok(Self { components })
    }

    /// Encode the collection as a blob
    pub fn encode(&self, format: RecordFormat) -> MultiResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(self.encoded_len(format)));
        match format {
            RecordFormat::Legacy => {
                for component in &self.components {
                    component.to_legacy_record().write(&mut cursor)?;
                }
            }
            RecordFormat::Modern => {
                ModernBlobHeader {
                    reserved: 0,
                    entry_count: component_count(self.components.len())?,
                }
                .write(&mut cursor)?;
                for component in &self.components {
                    component.to_modern_record()?.write(&mut cursor)?;
                }
            }
        }
        Ok(cursor.into_inner())
    }

    /// Size of [`Collection::encode`] output in bytes
    pub fn encoded_len(&self, format: RecordFormat) -> usize {
        match format {
            RecordFormat::Legacy => self.components.len() * LEGACY_RECORD_SIZE,
            RecordFormat::Modern => {
                MODERN_BLOB_HEADER_SIZE
                    + self
                        .components
                        .iter()
                        .map(|c| MODERN_RECORD_BASE_SIZE + 4 * c.localization_refs.len())
                        .sum::<usize>()
            }
        }
    }

    /// Append a component
    pub fn push(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the collection has no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components in stored order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Iterate over components
    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.components.iter()
    }

    /// Take ownership of the components
    pub fn into_components(self) -> Vec<Component> {
        self.components
    }
}

impl From<Vec<Component>> for Collection {
    fn from(components: Vec<Component>) -> Self {
        Self { components }
    }
}

impl FromIterator<Component> for Collection {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Collection {
    type Item = Component;
    type IntoIter = std::vec::IntoIter<Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

fn component_count(len: usize) -> MultiResult<u32> {
    u32::try_from(len).map_err(|_| MultiError::TooManyComponents(len))
}
