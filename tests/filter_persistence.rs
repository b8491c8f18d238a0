use offer_scout::filters::{FileStorage, STORE_NAME};
use offer_scout::{FilterStore, StateStorage};
use std::sync::Arc;

fn open(dir: &std::path::Path) -> FilterStore {
    FilterStore::open(Arc::new(FileStorage::new(dir).unwrap()))
}

#[test]
fn location_survives_a_restart_with_other_fields_intact() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open(dir.path());
        store.set_price(Some(520000.0));
        store.set_exclude(None);
        store.set_location(Some("Gdańsk".to_string()));
    }

    let store = open(dir.path());
    assert_eq!(store.location().as_deref(), Some("Gdańsk"));
    assert_eq!(store.price(), Some(520000.0));
    assert_eq!(store.rooms(), Some(0));
    assert_eq!(store.exclude(), None);
}

#[test]
fn record_on_disk_is_a_full_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    store.set_rooms(Some(3));

    let record = FileStorage::new(dir.path())
        .unwrap()
        .load(STORE_NAME)
        .unwrap()
        .unwrap();
    let state = record["state"].as_object().unwrap();
    assert_eq!(state.len(), 4);
    assert_eq!(state["rooms"], 3);
    assert_eq!(state["location"], "");
}

#[test]
fn corrupt_record_starts_from_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{}.json", STORE_NAME)), "{broken").unwrap();

    let store = open(dir.path());
    assert_eq!(store.location().as_deref(), Some(""));

    // The next write replaces the broken record
    store.set_location(Some("Gdynia".to_string()));
    assert_eq!(open(dir.path()).location().as_deref(), Some("Gdynia"));
}
