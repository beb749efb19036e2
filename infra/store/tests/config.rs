use factbase_store::{IdentityStore, IndexStrategy, ObjectStore, StoreConfig, StoreError};
use std::fs;

#[test]
fn test_default_config() {
    let config = StoreConfig::default();
    assert_eq!(config.capacity, 0);
    assert_eq!(config.index, IndexStrategy::Identity);
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder_rejects_wide_derived_key() {
    let result: Result<IdentityStore, _> =
        IdentityStore::builder().strategy(IndexStrategy::DerivedKey { bits: 33 }).build();

    assert!(matches!(result, Err(StoreError::InvalidConfig { .. })));
}

#[test]
fn test_builder_applies_strategy() {
    let store: IdentityStore = IdentityStore::builder()
        .capacity(16)
        .strategy(IndexStrategy::DerivedKey { bits: 8 })
        .build()
        .unwrap();

    assert_eq!(store.strategy(), IndexStrategy::DerivedKey { bits: 8 });
    assert!(store.is_empty());
}

#[test]
fn test_load_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.toml");
    fs::write(&path, "capacity = 256\n\n[index]\nkind = \"derived_key\"\nbits = 12\n").unwrap();

    let config = StoreConfig::load(Some(&path)).unwrap();

    assert_eq!(config.capacity, 256);
    assert_eq!(config.index, IndexStrategy::DerivedKey { bits: 12 });

    let store: IdentityStore = IdentityStore::with_config(config).unwrap();
    assert_eq!(store.strategy(), IndexStrategy::DerivedKey { bits: 12 });
}

#[test]
fn test_load_partial_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.toml");
    fs::write(&path, "capacity = 8\n").unwrap();

    let config = StoreConfig::load(Some(&path)).unwrap();

    assert_eq!(config, StoreConfig { capacity: 8, index: IndexStrategy::Identity });
}

#[test]
fn test_load_rejects_out_of_range_bits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.toml");
    fs::write(&path, "[index]\nkind = \"derived_key\"\nbits = 40\n").unwrap();

    let err = StoreConfig::load(Some(&path)).unwrap_err();

    assert!(matches!(err, StoreError::InvalidConfig { .. }), "unexpected error: {err}");
}

#[test]
fn test_load_missing_file_reports_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = StoreConfig::load(Some(&path)).unwrap_err();

    assert!(matches!(err, StoreError::Config { context: Some(_), .. }));
    assert!(err.to_string().contains("Failed to build store config"), "unexpected error: {err}");
}
