//! Building containers from text sources and exporting them back

use crate::config::StorageConfig;
use crate::storage::{ContainerKind, MultiStorage, write_legacy, write_modern};
use crate::{Result, StorageError};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uomulti_formats::multi::Collection;
use walkdir::WalkDir;

/// Outcome of building a container from a source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Number of source files read
    pub sources: usize,
    /// Highest id written
    pub max_id: u32,
    /// Size of the housing blob, modern containers only
    pub housing_bytes: Option<usize>,
}

/// Outcome of exporting a container to text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of text files written
    pub collections: usize,
    /// Path of the housing blob, modern containers only
    pub housing: Option<PathBuf>,
}

/// Parse a source file stem as an id
///
/// Leading zeros are stripped so `0042` is id 42 rather than octal.
fn parse_source_id(stem: &str) -> Option<u32> {
    let digits = stem.trim_start_matches('0');
    if digits.is_empty() {
        return (!stem.is_empty()).then_some(0);
    }
    digits.parse().ok()
}

/// Find text sources under `dir`, keyed by id
///
/// Walks the directory recursively and matches the extension
/// case-insensitively. Files whose stem is not a decimal id are skipped;
/// two files naming the same id are an error.
pub fn discover_sources<P: AsRef<Path>>(
    dir: P,
    extension: &str,
) -> Result<BTreeMap<u32, PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(StorageError::MissingData(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut sources = BTreeMap::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| StorageError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches_extension {
            continue;
        }

        let Some(id) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(parse_source_id)
        else {
            warn!("Skipping {}: file name is not an id", path.display());
            continue;
        };

        if let Some(previous) = sources.insert(id, path.to_path_buf()) {
            return Err(StorageError::InvalidSource {
                path: path.to_path_buf(),
                reason: format!("id {id} is also defined by {}", previous.display()),
            });
        }
    }

    debug!("Discovered {} sources in {}", sources.len(), dir.display());
    Ok(sources)
}

/// Read one text source
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<Collection> {
    let text = fs::read_to_string(path)?;
    Ok(Collection::from_text(&text))
}

fn read_sources(dir: &Path, config: &StorageConfig) -> Result<BTreeMap<u32, Collection>> {
    let sources = discover_sources(dir, &config.text_extension)?;
    if sources.is_empty() {
        return Err(StorageError::MissingData(format!(
            "no .{} sources in {}",
            config.text_extension,
            dir.display()
        )));
    }

    let mut collections = BTreeMap::new();
    for (id, path) in sources {
        collections.insert(id, read_source(&path)?);
    }
    Ok(collections)
}

fn summary(collections: &BTreeMap<u32, Collection>, housing_bytes: Option<usize>) -> BuildSummary {
    BuildSummary {
        sources: collections.len(),
        max_id: collections.last_key_value().map_or(0, |(&id, _)| id),
        housing_bytes,
    }
}

/// Build a legacy `.mul`/`.idx` pair from a source directory
pub fn build_legacy<P: AsRef<Path>>(
    source_dir: P,
    data: &Path,
    index: &Path,
    config: &StorageConfig,
) -> Result<BuildSummary> {
    let source_dir = source_dir.as_ref();
    let collections = read_sources(source_dir, config)?;

    let mut data_writer = BufWriter::new(File::create(data)?);
    let mut index_writer = BufWriter::new(File::create(index)?);
    write_legacy(&mut data_writer, &mut index_writer, &collections, config)?;

    info!(
        "Built {} and {} from {} sources",
        data.display(),
        index.display(),
        collections.len()
    );
    Ok(summary(&collections, None))
}

/// Build a UOP container from a source directory
///
/// The housing blob is read from `housing_name` inside the source directory
/// (the configured housing file name when `None`) and must not be empty.
pub fn build_modern<P: AsRef<Path>>(
    source_dir: P,
    output: &Path,
    housing_name: Option<&str>,
    config: &StorageConfig,
) -> Result<BuildSummary> {
    let source_dir = source_dir.as_ref();
    let housing_path =
        source_dir.join(housing_name.unwrap_or(config.housing_file_name.as_str()));
    if !housing_path.is_file() {
        return Err(StorageError::missing_file(&housing_path));
    }
    let housing = fs::read(&housing_path)?;
    if housing.is_empty() {
        return Err(StorageError::MissingData(format!(
            "{} is empty",
            housing_path.display()
        )));
    }

    let collections = read_sources(source_dir, config)?;
    write_modern(
        BufWriter::new(File::create(output)?),
        &collections,
        &housing,
        config,
    )?;

    info!(
        "Built {} from {} sources",
        output.display(),
        collections.len()
    );
    Ok(summary(&collections, Some(housing.len())))
}

impl<R: Read + Seek> MultiStorage<R> {
    /// Write every non-empty collection as `{id:04}.<ext>` text under `dir`
    ///
    /// Modern containers also write their housing blob as `housing_name`
    /// (the configured housing file name when `None`).
    pub fn export_text<P: AsRef<Path>>(
        &mut self,
        dir: P,
        housing_name: Option<&str>,
    ) -> Result<ExportSummary> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let extension = self.config().text_extension.clone();
        let ids: Vec<u32> = self.ids().collect();
        let mut written = 0;
        for id in ids {
            let collection = self.read(id)?;
            if collection.is_empty() {
                continue;
            }
            fs::write(dir.join(format!("{id:04}.{extension}")), collection.to_text())?;
            written += 1;
        }

        let housing = if self.kind() == ContainerKind::Modern {
            let name = housing_name
                .map_or_else(|| self.config().housing_file_name.clone(), str::to_string);
            let path = dir.join(name);
            fs::write(&path, self.read_housing()?)?;
            Some(path)
        } else {
            None
        };

        info!("Exported {} multis to {}", written, dir.display());
        Ok(ExportSummary {
            collections: written,
            housing,
        })
    }
}
