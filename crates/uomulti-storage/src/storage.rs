//! Id-indexed access to legacy and modern multi containers

use crate::config::StorageConfig;
use crate::legacy::{IndexRecord, read_index, write_index};
use crate::{Result, StorageError};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info};
use uomulti_formats::multi::constants::LEGACY_RECORD_SIZE;
use uomulti_formats::multi::{Collection, RecordFormat};
use uomulti_formats::uop::{
    CompressionKind, ContainerHeader, ContainerWriter, DirectoryEntry, collect_entry_offsets,
    resolve_identifiers,
};
use uomulti_hash::identifier_hash;

/// Container variant an instance was opened from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// `multi.idx` + `multi.mul`
    Legacy,
    /// `MultiCollection.uop`
    Modern,
}

impl ContainerKind {
    /// Record layout of blobs in this container variant
    pub const fn record_format(self) -> RecordFormat {
        match self {
            Self::Legacy => RecordFormat::Legacy,
            Self::Modern => RecordFormat::Modern,
        }
    }
}

/// Open multi container
///
/// The id index is built once at open time. Reading seeks the underlying
/// reader, so reads take `&mut self`.
pub struct MultiStorage<R: Read + Seek = BufReader<File>> {
    /// Blob source (`.mul` or `.uop`)
    reader: R,
    /// Which variant was opened
    kind: ContainerKind,
    /// Directory entries keyed by id
    entries: BTreeMap<u32, DirectoryEntry>,
    /// Housing blob entry, modern containers only
    housing: Option<DirectoryEntry>,
    /// Configuration used to open the container
    config: StorageConfig,
}

fn open_file(path: &Path) -> Result<BufReader<File>> {
    if !path.exists() {
        return Err(StorageError::missing_file(path));
    }
    Ok(BufReader::new(File::open(path)?))
}

impl MultiStorage {
    /// Open a container from disk
    ///
    /// With an index path the pair is opened as legacy `.mul` + `.idx`,
    /// otherwise `data` is opened as a UOP container.
    pub fn open<P: AsRef<Path>>(
        data: P,
        index: Option<&Path>,
        config: &StorageConfig,
    ) -> Result<Self> {
        match index {
            Some(index) => Self::open_legacy(data, index, config),
            None => Self::open_modern(data, config),
        }
    }

    /// Open a legacy `.mul` data file and its `.idx` index
    pub fn open_legacy<P: AsRef<Path>, Q: AsRef<Path>>(
        data: P,
        index: Q,
        config: &StorageConfig,
    ) -> Result<Self> {
        let data = data.as_ref();
        let index = index.as_ref();
        info!(
            "Opening legacy container {} with index {}",
            data.display(),
            index.display()
        );
        let mut index_reader = open_file(index)?;
        Self::from_legacy_readers(open_file(data)?, &mut index_reader, config)
    }

    /// Open a UOP container
    pub fn open_modern<P: AsRef<Path>>(path: P, config: &StorageConfig) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening UOP container {}", path.display());
        Self::from_modern_reader(open_file(path)?, config)
    }
}

impl<R: Read + Seek> MultiStorage<R> {
    /// Open a legacy container from a data reader and an index reader
    pub fn from_legacy_readers<I: Read + Seek>(
        reader: R,
        index: &mut I,
        config: &StorageConfig,
    ) -> Result<Self> {
        let entries = read_index(index)?;
        info!("Indexed {} legacy multis", entries.len());
        Ok(Self {
            reader,
            kind: ContainerKind::Legacy,
            entries,
            housing: None,
            config: config.clone(),
        })
    }

    /// Open a UOP container from a reader
    ///
    /// The container must hold a housing blob.
    pub fn from_modern_reader(mut reader: R, config: &StorageConfig) -> Result<Self> {
        let header = ContainerHeader::read_validated(&mut reader, &config.layout)?;
        debug!(
            "UOP header: version {}, {} entries, first table at {}",
            header.version, header.total_entries, header.first_table_offset
        );

        let registry = config.registry()?;
        let offsets = collect_entry_offsets(&mut reader)?;
        let mut entries = resolve_identifiers(&mut reader, &registry, &offsets)?;

        let housing = entries.remove(&config.housing_id).ok_or_else(|| {
            StorageError::MissingData(format!(
                "container has no housing entry ({:016x})",
                config.housing_hash
            ))
        })?;

        info!("Indexed {} modern multis", entries.len());
        Ok(Self {
            reader,
            kind: ContainerKind::Modern,
            entries,
            housing: Some(housing),
            config: config.clone(),
        })
    }

    /// Container variant
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Configuration the container was opened with
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Number of indexed ids (housing excluded)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no ids are indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Directory entry for an id
    pub fn entry(&self, id: u32) -> Option<&DirectoryEntry> {
        self.entries.get(&id)
    }

    /// Directory entry of the housing blob
    pub fn housing_entry(&self) -> Option<&DirectoryEntry> {
        self.housing.as_ref()
    }

    /// Highest indexed id
    pub fn max_id(&self) -> Result<u32> {
        self.entries
            .last_key_value()
            .map(|(&id, _)| id)
            .ok_or(StorageError::EmptyIndex)
    }

    /// Read and decode the collection for an id
    ///
    /// Ids that are not indexed, and entries too short to hold a record,
    /// produce an empty collection.
    pub fn read(&mut self, id: u32) -> Result<Collection> {
        let Some(entry) = self.entries.get(&id).copied() else {
            return Ok(Collection::new());
        };
        if (entry.decompressed_length as usize) < LEGACY_RECORD_SIZE {
            return Ok(Collection::new());
        }

        let data = self.fetch(&entry)?;
        Ok(Collection::decode(&data, self.kind.record_format())?)
    }

    /// Read the raw housing blob
    pub fn read_housing(&mut self) -> Result<Vec<u8>> {
        if self.kind == ContainerKind::Legacy {
            return Err(StorageError::HousingUnavailable);
        }
        let entry = self
            .housing
            .ok_or_else(|| StorageError::MissingData("housing entry".to_string()))?;
        self.fetch(&entry)
    }

    /// Write every collection into a new container
    ///
    /// With an index path the output is a legacy pair, otherwise a UOP
    /// container holding `housing` as its housing blob.
    pub fn save<P: AsRef<Path>>(
        &mut self,
        data: P,
        index: Option<&Path>,
        housing: &[u8],
    ) -> Result<()> {
        let data = data.as_ref();
        match index {
            Some(index) => {
                if self.entries.is_empty() {
                    return Err(StorageError::EmptyIndex);
                }
                let collections = self.read_all()?;
                info!(
                    "Saving {} multis to {} and {}",
                    collections.len(),
                    data.display(),
                    index.display()
                );
                let mut data_writer = BufWriter::new(File::create(data)?);
                let mut index_writer = BufWriter::new(File::create(index)?);
                write_legacy(&mut data_writer, &mut index_writer, &collections, &self.config)?;
            }
            None => {
                if housing.is_empty() {
                    return Err(StorageError::MissingData(
                        "housing data is required for UOP output".to_string(),
                    ));
                }
                let collections = self.read_all()?;
                info!("Saving {} multis to {}", collections.len(), data.display());
                write_modern(
                    BufWriter::new(File::create(data)?),
                    &collections,
                    housing,
                    &self.config,
                )?;
            }
        }
        Ok(())
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_all(&mut self) -> Result<BTreeMap<u32, Collection>> {
        let ids: Vec<u32> = self.ids().collect();
        let mut collections = BTreeMap::new();
        for id in ids {
            collections.insert(id, self.read(id)?);
        }
        Ok(collections)
    }

    fn fetch(&mut self, entry: &DirectoryEntry) -> Result<Vec<u8>> {
        let range = entry.data_range()?;
        self.reader.seek(SeekFrom::Start(range.start))?;

        // Lengths come from the directory; grow only as far as the data goes
        let mut stored = Vec::new();
        self.reader
            .by_ref()
            .take(range.end - range.start)
            .read_to_end(&mut stored)?;
        if stored.len() != entry.compressed_length as usize {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "blob at {} needs {} bytes, stream holds {}",
                    range.start,
                    entry.compressed_length,
                    stored.len()
                ),
            )));
        }

        let compression = entry.compression_kind()?;
        Ok(compression.decompress(&stored, entry.decompressed_length as usize)?)
    }
}

/// Write collections as a legacy data file and index
///
/// The index covers `max(legacy_min_entries, highest id + 1)` ids; ids with
/// no data (or an empty collection) get [`IndexRecord::MISSING`]. Returns the
/// number of index records written.
pub fn write_legacy<D: Write, I: Write + Seek>(
    data: &mut D,
    index: &mut I,
    collections: &BTreeMap<u32, Collection>,
    config: &StorageConfig,
) -> Result<usize> {
    let needed = collections
        .last_key_value()
        .map_or(0, |(&id, _)| id as usize + 1);
    let count = needed.max(config.legacy_min_entries as usize);

    let mut records = vec![IndexRecord::MISSING; count];
    let mut offset = 0u32;
    for (&id, collection) in collections {
        if collection.is_empty() {
            continue;
        }
        let blob = collection.encode(RecordFormat::Legacy)?;
        let length = u32::try_from(blob.len()).map_err(|_| data_too_large())?;
        records[id as usize] = IndexRecord {
            offset,
            length,
            reserved: 0,
        };
        data.write_all(&blob)?;
        offset = offset.checked_add(length).ok_or_else(data_too_large)?;
    }
    data.flush()?;
    write_index(index, &records)?;

    debug!("Wrote {} index records, {} data bytes", count, offset);
    Ok(count)
}

/// Write collections and a housing blob as a UOP container
///
/// Entries are written in ascending id order with the housing blob last,
/// every blob zlib-compressed. Returns the writer.
pub fn write_modern<W: Write + Seek>(
    writer: W,
    collections: &BTreeMap<u32, Collection>,
    housing: &[u8],
    config: &StorageConfig,
) -> Result<W> {
    let template = config.template()?;
    let slots = u32::try_from(collections.len() + 1).map_err(|_| data_too_large())?;

    let mut container = ContainerWriter::create(writer, &config.layout, slots)?;
    for (&id, collection) in collections {
        let blob = collection.encode(RecordFormat::Modern)?;
        container.append(
            identifier_hash(template.format(id)),
            &blob,
            CompressionKind::Zlib,
        )?;
    }
    container.append(config.housing_hash, housing, CompressionKind::Zlib)?;

    debug!(
        "Wrote {} UOP entries, {} bytes",
        slots,
        container.position()
    );
    Ok(container.finish()?)
}

fn data_too_large() -> StorageError {
    StorageError::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        "legacy data file would exceed 4 GiB",
    ))
}
