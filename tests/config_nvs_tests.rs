//! Parameter validation and persistence tests

use rust_secure_vlc_link::config::nvs::{
    MemoryPartition, MigrationResult, NvsError, ParamStore, CURRENT_SCHEMA_VERSION,
};
use rust_secure_vlc_link::config::{
    ConfigError, MapSeed, MAX_ITERATIONS, MIN_ITERATIONS, PARAMS_BLOB_LEN,
};
use rust_secure_vlc_link::{Direction, EncryptionParams, MapVariant};

fn params() -> EncryptionParams {
    EncryptionParams::new(
        MapVariant::Logistic,
        MapSeed::new(0.25, 0.5, 1_000),
        MapSeed::new(0.75, 0.125, 4_000),
    )
}

#[test]
fn test_blob_layout() {
    let blob = params().to_bytes();
    assert_eq!(blob.len(), PARAMS_BLOB_LEN);
    assert_eq!(blob[0], MapVariant::Logistic as u8);
    assert_eq!(&blob[1..9], &0.25f64.to_le_bytes());
    assert_eq!(&blob[33..37], &1_000u32.to_le_bytes());
    assert_eq!(&blob[37..41], &4_000u32.to_le_bytes());
    assert_eq!(EncryptionParams::from_bytes(&blob), Some(params()));
}

#[test]
fn test_blob_rejects_bad_input() {
    let mut blob = params().to_bytes();
    assert_eq!(EncryptionParams::from_bytes(&blob[..40]), None);
    blob[0] = 7;
    assert_eq!(EncryptionParams::from_bytes(&blob), None);
}

#[test]
fn test_validate_domains() {
    let mut p = params();
    p.map2.y = -0.1;
    assert!(matches!(
        p.validate(),
        Err(ConfigError::OutOfDomain { field: "y2", .. })
    ));

    let mut p = params();
    p.map1.x = f64::NAN;
    assert!(p.validate().is_err());

    let mut p = EncryptionParams::new(
        MapVariant::Duffing,
        MapSeed::new(-1.2, 1.2, 0),
        MapSeed::new(0.0, 0.0, u32::MAX),
    );
    p = p.validate().unwrap();
    assert_eq!(p.map1.iterations, MIN_ITERATIONS);
    assert_eq!(p.map2.iterations, MAX_ITERATIONS);
}

#[test]
fn test_direction_flags() {
    assert_eq!(Direction::parse("-TX"), Some(Direction::Tx));
    assert_eq!(Direction::parse("-rx"), Some(Direction::Rx));
    assert_eq!(Direction::parse("TX"), None);
}

#[test]
fn test_store_fresh_install_then_reopen() {
    let store = ParamStore::open(MemoryPartition::new()).unwrap();
    assert_eq!(store.status(), MigrationResult::FreshInstall);
    assert!(store.load(Direction::Tx).unwrap().is_none());

    let mut store = store;
    store.save(Direction::Rx, &params()).unwrap();

    let reopened = ParamStore::open(store.into_partition()).unwrap();
    assert_eq!(reopened.status(), MigrationResult::UpToDate);
    assert_eq!(reopened.load(Direction::Rx).unwrap(), Some(params()));
    assert!(reopened.load(Direction::Tx).unwrap().is_none());
}

#[test]
fn test_store_refuses_newer_schema() {
    let mut partition = MemoryPartition::new();
    partition.schema_version = CURRENT_SCHEMA_VERSION + 1;

    assert!(matches!(
        ParamStore::open(partition),
        Err(NvsError::TooNew { .. })
    ));
}

#[test]
fn test_store_reports_corrupt_blob() {
    let mut partition = MemoryPartition::new();
    partition.schema_version = CURRENT_SCHEMA_VERSION;
    let mut blob = params().to_bytes();
    blob[0] = 0xEE;
    partition.tx = Some(blob);

    let store = ParamStore::open(partition).unwrap();
    assert!(matches!(
        store.load(Direction::Tx),
        Err(NvsError::Corrupt { key: "tx_params" })
    ));
}
