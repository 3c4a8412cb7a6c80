//! Configuration for the storage system

use crate::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uomulti_formats::uop::ContainerLayout;
use uomulti_hash::{IdentifierRegistry, NameTemplate};

/// Configuration for the storage system
///
/// Every field has a default matching the shipped game files, so a JSON
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Template hashed to produce each entry's identifier
    pub name_template: String,

    /// First id hashed when resolving a modern container
    pub id_range_start: u32,

    /// Last id (inclusive) hashed when resolving a modern container
    pub id_range_end: u32,

    /// Identifier of the housing blob
    pub housing_hash: u64,

    /// Sentinel id the housing blob is registered under
    pub housing_id: u32,

    /// Minimum number of records in a legacy index
    pub legacy_min_entries: u32,

    /// File name used for the housing blob in source directories
    pub housing_file_name: String,

    /// Extension of text source files
    pub text_extension: String,

    /// UOP header values
    pub layout: ContainerLayout,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            name_template: "build/multicollection/%.6u.bin".to_string(),
            id_range_start: 0,
            id_range_end: 0x10000,
            housing_hash: 0x126D_1E99_DDED_EE0A,
            housing_id: 0xFFFF_FFFE,
            legacy_min_entries: 8480,
            housing_file_name: "housing.bin".to_string(),
            text_extension: "csv".to_string(),
            layout: ContainerLayout::default(),
        }
    }
}

impl StorageConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| StorageError::Config(format!("{}: {e}", path.display())))
    }

    /// Set the entry name template
    #[must_use]
    pub fn with_name_template(mut self, template: impl Into<String>) -> Self {
        self.name_template = template.into();
        self
    }

    /// Set the inclusive id range hashed for modern containers
    #[must_use]
    pub const fn with_id_range(mut self, start: u32, end: u32) -> Self {
        self.id_range_start = start;
        self.id_range_end = end;
        self
    }

    /// Set the minimum legacy index size
    #[must_use]
    pub const fn with_legacy_min_entries(mut self, count: u32) -> Self {
        self.legacy_min_entries = count;
        self
    }

    /// Set the housing blob file name
    #[must_use]
    pub fn with_housing_file_name(mut self, name: impl Into<String>) -> Self {
        self.housing_file_name = name.into();
        self
    }

    /// Set the UOP header layout
    #[must_use]
    pub const fn with_layout(mut self, layout: ContainerLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Parse the entry name template
    pub fn template(&self) -> Result<NameTemplate> {
        Ok(NameTemplate::parse(&self.name_template)?)
    }

    /// Build the identifier registry used to resolve modern containers
    ///
    /// Covers every id in the configured range plus the housing pair.
    pub fn registry(&self) -> Result<IdentifierRegistry> {
        let mut registry =
            IdentifierRegistry::from_template(&self.template()?, self.id_range_start..=self.id_range_end);
        registry.insert(self.housing_hash, self.housing_id);
        Ok(registry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use uomulti_hash::identifier_hash;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.legacy_min_entries, 8480);
        assert_eq!(config.housing_id, 0xFFFF_FFFE);
        assert_eq!(
            config.template().unwrap().format(42),
            "build/multicollection/000042.bin"
        );
    }

    #[test]
    fn test_registry_includes_housing() {
        let config = StorageConfig::default().with_id_range(0, 15);
        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 17);
        assert_eq!(registry.get(0x126D_1E99_DDED_EE0A), Some(0xFFFF_FFFE));
        assert_eq!(
            registry.get(identifier_hash("build/multicollection/000015.bin")),
            Some(15)
        );
    }

    #[test]
    fn test_invalid_template() {
        let config = StorageConfig::default().with_name_template("no conversion");
        assert!(matches!(config.registry(), Err(StorageError::Hash(_))));
    }

    #[test]
    fn test_partial_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"legacy_min_entries": 16, "layout": {{"page_capacity": 50}}}}"#
        )
        .unwrap();

        let config = StorageConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.legacy_min_entries, 16);
        assert_eq!(config.layout.page_capacity, 50);
        assert_eq!(config.layout.first_table_offset, 512);
        assert_eq!(config.housing_file_name, "housing.bin");
    }

    #[test]
    fn test_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            StorageConfig::from_json_file(file.path()),
            Err(StorageError::Config(_))
        ));
    }
}
