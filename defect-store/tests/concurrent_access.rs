use chrono::TimeDelta;
use recallscope_records::{ProviderPayload, VehicleKey};
use recallscope_store::{CacheStore, ComplaintFlattener, DefectStore};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn key() -> VehicleKey {
    VehicleKey::parse("2015", "Jeep", "Cherokee").expect("valid key")
}

#[test_log::test]
fn test_shared_handle_concurrent_puts_keep_one_entry() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(DefectStore::open(&temp_dir.path().join("cache.db")).expect("open"));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let cache = CacheStore::new(&store);
                cache
                    .put(&key(), &json!({"writer": i}), &json!({"writer": i}))
                    .expect("put");
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let hit = CacheStore::new(&store)
        .get(&key(), TimeDelta::hours(1))
        .expect("get")
        .expect("entry present");
    let writer = hit.recalls["writer"].as_i64().expect("writer id");
    assert!((0..8).contains(&writer));
    assert_eq!(hit.recalls, hit.complaints);
}

#[test_log::test]
fn test_separate_handles_on_one_file_see_each_other() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("cache.db");
    let writer = DefectStore::open(&db_path).expect("open writer");
    let reader = DefectStore::open(&db_path).expect("open reader");

    let payload = ProviderPayload::from_value(json!({
        "results": (0..50)
            .map(|i| json!({"odiNumber": format!("{i}"), "summary": "door latch"}))
            .collect::<Vec<_>>()
    }));

    let written = thread::scope(|scope| {
        let upsert = scope.spawn(|| ComplaintFlattener::new(&writer).upsert(&key(), &payload));
        // Readers never observe a half-applied payload.
        let seen = ComplaintFlattener::new(&reader)
            .complaints_for(&key())
            .expect("read during write")
            .len();
        assert!(seen == 0 || seen == 50, "partial upsert visible: {seen}");
        upsert.join().expect("upsert thread panicked")
    })
    .expect("upsert");

    assert_eq!(written, 50);
    let rows = ComplaintFlattener::new(&reader)
        .complaints_for(&key())
        .expect("read after write");
    assert_eq!(rows.len(), 50);
}
