#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for building, opening, converting and exporting
//! multi containers on disk

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use uomulti_formats::multi::{Collection, Component};
use uomulti_storage::{
    ContainerKind, MultiStorage, StorageConfig, StorageError, build_legacy, build_modern,
};

const HOUSING: &[u8] = b"opaque housing table bytes";

fn component(tile_id: u16, z: i16, refs: &[u32]) -> Component {
    Component {
        tile_id,
        offset_x: -3,
        offset_y: 4,
        offset_z: z,
        flag: 1,
        localization_refs: refs.to_vec(),
    }
}

fn write_source(dir: &Path, id: u32, collection: &Collection) {
    fs::write(dir.join(format!("{id:04}.csv")), collection.to_text()).unwrap();
}

fn source_dir(collections: &[(u32, Collection)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (id, collection) in collections {
        write_source(dir.path(), *id, collection);
    }
    fs::write(dir.path().join("housing.bin"), HOUSING).unwrap();
    dir
}

// --- Legacy ---

#[test]
fn legacy_single_source_gets_sentinel_records() {
    let sources = source_dir(&[(7, Collection::from(vec![component(0x10, 0, &[])]))]);
    let out = TempDir::new().unwrap();
    let data = out.path().join("multi.mul");
    let index = out.path().join("multi.idx");
    let config = StorageConfig::default();

    let summary = build_legacy(sources.path(), &data, &index, &config).unwrap();
    assert_eq!(summary.sources, 1);
    assert_eq!(summary.max_id, 7);

    let index_bytes = fs::read(&index).unwrap();
    assert_eq!(index_bytes.len(), 8480 * 12);
    // id 0 is the missing sentinel
    assert_eq!(&index_bytes[0..12], &[0xFE, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0]);
    // id 7 points at the only record
    assert_eq!(&index_bytes[84..96], &[0, 0, 0, 0, 16, 0, 0, 0, 0, 0, 0, 0]);

    let mut storage = MultiStorage::open_legacy(&data, &index, &config).unwrap();
    assert_eq!(storage.kind(), ContainerKind::Legacy);
    assert_eq!(storage.ids().collect::<Vec<_>>(), vec![7]);
    assert_eq!(storage.read(7).unwrap().components()[0].tile_id, 0x10);
    assert!(storage.read(6).unwrap().is_empty());
}

// --- Modern ---

#[test]
fn modern_build_and_read() {
    let tower = Collection::from(vec![
        component(0x0001, 0, &[1_061_999]),
        component(0x0002, 20, &[]),
    ]);
    let tent = Collection::from(vec![component(0x0003, 0, &[5, 6])]);
    let keep = Collection::from(vec![component(0x3EE1, 40, &[])]);
    let sources = source_dir(&[(0, tower.clone()), (3, tent.clone()), (1000, keep.clone())]);

    let out = TempDir::new().unwrap();
    let uop = out.path().join("MultiCollection.uop");
    let config = StorageConfig::default();

    let summary = build_modern(sources.path(), &uop, None, &config).unwrap();
    assert_eq!(summary.sources, 3);
    assert_eq!(summary.housing_bytes, Some(HOUSING.len()));

    let mut storage = MultiStorage::open(&uop, None, &config).unwrap();
    assert_eq!(storage.kind(), ContainerKind::Modern);
    assert_eq!(storage.len(), 3);
    assert_eq!(storage.max_id().unwrap(), 1000);
    assert_eq!(storage.read(0).unwrap(), tower);
    assert_eq!(storage.read(3).unwrap(), tent);
    assert_eq!(storage.read(1000).unwrap(), keep);
    assert_eq!(storage.read_housing().unwrap(), HOUSING);

    let housing = *storage.housing_entry().unwrap();
    assert_eq!(housing.identifier, 0x126D_1E99_DDED_EE0A);
    assert_eq!(housing.decompressed_length as usize, HOUSING.len());
    assert_eq!(housing.compression, 1);
}

#[test]
fn modern_build_requires_housing() {
    let sources = TempDir::new().unwrap();
    write_source(
        sources.path(),
        1,
        &Collection::from(vec![component(1, 0, &[])]),
    );
    let out = TempDir::new().unwrap();

    let result = build_modern(
        sources.path(),
        &out.path().join("out.uop"),
        None,
        &StorageConfig::default(),
    );
    assert!(matches!(result, Err(StorageError::MissingData(_))));
}

// --- Conversion ---

#[test]
fn legacy_modern_legacy_conversion_keeps_collections() {
    let first = Collection::from(vec![component(0x0100, 0, &[]), component(0x0101, 5, &[])]);
    let second = Collection::from(vec![component(0x0200, -5, &[])]);
    let sources = source_dir(&[(2, first.clone()), (9000, second.clone())]);
    let out = TempDir::new().unwrap();
    let config = StorageConfig::default();

    let mul = out.path().join("multi.mul");
    let idx = out.path().join("multi.idx");
    build_legacy(sources.path(), &mul, &idx, &config).unwrap();

    // legacy -> modern
    let uop = out.path().join("MultiCollection.uop");
    let mut legacy = MultiStorage::open(&mul, Some(&idx), &config).unwrap();
    legacy.save(&uop, None, HOUSING).unwrap();

    let mut modern = MultiStorage::open_modern(&uop, &config).unwrap();
    assert_eq!(modern.read(2).unwrap(), first);
    assert_eq!(modern.read(9000).unwrap(), second);

    // modern -> legacy
    let mul2 = out.path().join("multi2.mul");
    let idx2 = out.path().join("multi2.idx");
    let housing = modern.read_housing().unwrap();
    modern.save(&mul2, Some(&idx2), &housing).unwrap();

    assert_eq!(fs::read(&idx2).unwrap().len(), 9001 * 12);
    let mut roundtrip = MultiStorage::open_legacy(&mul2, &idx2, &config).unwrap();
    assert_eq!(roundtrip.read(2).unwrap(), first);
    assert_eq!(roundtrip.read(9000).unwrap(), second);
    assert_eq!(fs::read(&mul2).unwrap(), fs::read(&mul).unwrap());
}

#[test]
fn save_to_modern_requires_housing_bytes() {
    let sources = source_dir(&[(1, Collection::from(vec![component(1, 0, &[])]))]);
    let out = TempDir::new().unwrap();
    let config = StorageConfig::default();
    let mul = out.path().join("multi.mul");
    let idx = out.path().join("multi.idx");
    build_legacy(sources.path(), &mul, &idx, &config).unwrap();

    let mut storage = MultiStorage::open_legacy(&mul, &idx, &config).unwrap();
    assert!(matches!(
        storage.save(out.path().join("out.uop"), None, &[]),
        Err(StorageError::MissingData(_))
    ));
}

// --- Export ---

#[test]
fn export_then_create_round_trip() {
    let sources = source_dir(&[
        (1, Collection::from(vec![component(0x0AAA, 1, &[7, 8])])),
        (42, Collection::from(vec![component(0x0BBB, 2, &[])])),
    ]);
    let out = TempDir::new().unwrap();
    let config = StorageConfig::default();
    let uop = out.path().join("first.uop");
    build_modern(sources.path(), &uop, Some("housing.bin"), &config).unwrap();

    let exported = out.path().join("exported");
    let mut storage = MultiStorage::open_modern(&uop, &config).unwrap();
    let summary = storage.export_text(&exported, None).unwrap();
    assert_eq!(summary.collections, 2);
    assert_eq!(summary.housing, Some(exported.join("housing.bin")));
    assert!(exported.join("0001.csv").is_file());
    assert!(exported.join("0042.csv").is_file());
    assert!(
        fs::read_to_string(exported.join("0042.csv"))
            .unwrap()
            .starts_with("TileID,OffsetX,OffsetY,OffsetZ,Flag,Cliloc\n0x0BBB,")
    );

    let rebuilt = out.path().join("second.uop");
    build_modern(&exported, &rebuilt, None, &config).unwrap();
    assert_eq!(fs::read(&rebuilt).unwrap(), fs::read(&uop).unwrap());
}

// --- Errors ---

#[test]
fn missing_files_are_reported() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig::default();

    assert!(matches!(
        MultiStorage::open_modern(dir.path().join("absent.uop"), &config),
        Err(StorageError::MissingData(_))
    ));
    assert!(matches!(
        MultiStorage::open_legacy(
            dir.path().join("multi.mul"),
            dir.path().join("multi.idx"),
            &config
        ),
        Err(StorageError::MissingData(_))
    ));
}

#[test]
fn empty_source_directory_is_rejected() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let result = build_legacy(
        dir.path(),
        &out.path().join("multi.mul"),
        &out.path().join("multi.idx"),
        &StorageConfig::default(),
    );
    assert!(matches!(result, Err(StorageError::MissingData(_))));
}

#[test]
fn foreign_file_is_not_a_container() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not.uop");
    fs::write(&path, vec![0x42u8; 1024]).unwrap();

    assert!(matches!(
        MultiStorage::open_modern(&path, &StorageConfig::default()),
        Err(StorageError::Uop(_))
    ));
}
