use recallscope_geo_indexer::layout::{FIELD_COUNT, MAKE_COL, MODEL_COL, STATE_COL, YEAR_COL};
use recallscope_geo_indexer::{
    BreakdownSource, GeoCountStore, GeoIndexBuilder, GeoIndexConfig, StateBreakdown, state_counts,
};
use recallscope_records::{StateCount, VehicleKey};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn line(make: &str, model: &str, year: &str, state: &str) -> String {
    let mut fields = vec![""; FIELD_COUNT];
    fields[MAKE_COL] = make;
    fields[MODEL_COL] = model;
    fields[YEAR_COL] = year;
    fields[STATE_COL] = state;
    fields.join("\t")
}

fn write_dump(dir: &Path) -> PathBuf {
    let lines = [
        line("HONDA", "ACCORD", "2020", "CA"),
        line("honda", "accord", "2020", "ca"),
        line("HONDA", "ACCORD", "2020", "TX"),
        line("HONDA", "ACCORD", "2020", "CAL"),
        line("FORD", "F150 4DR", "2018", "OK"),
        line("FORD", "F-150", "2018", "TX"),
        line("FORD", "F-150", "2018", "TX"),
    ];
    let path = dir.join("FLAT_CMPL.txt");
    fs::write(&path, lines.join("\n") + "\n").expect("write dump");
    path
}

fn build(dir: &TempDir, chunk_size: usize) -> GeoCountStore {
    let config = GeoIndexConfig {
        input_path: write_dump(dir.path()),
        db_path: dir.path().join("geo.sqlite"),
        chunk_size,
    };
    let store = GeoCountStore::open(&config.db_path).expect("open index");
    GeoIndexBuilder::new(config, &store)
        .expect("valid config")
        .build(None)
        .expect("build");
    store
}

fn sc(state: &str, count: u64) -> StateCount {
    StateCount {
        state: state.into(),
        count,
    }
}

#[test_log::test]
fn test_accord_counts_by_state() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = build(&temp_dir, 250_000);

    let key = VehicleKey::parse("2020", "Honda", "Accord").expect("valid key");
    assert_eq!(state_counts(&store, &key).expect("query"), vec![sc("CA", 2), sc("TX", 1)]);
}

#[test_log::test]
fn test_chunk_size_does_not_change_totals() {
    let small = TempDir::new().expect("Failed to create temp dir");
    let large = TempDir::new().expect("Failed to create temp dir");
    let by_one = build(&small, 1);
    let by_all = build(&large, 1_000);

    for (year, make, model) in [("2020", "HONDA", "ACCORD"), ("2018", "FORD", "F150")] {
        let key = VehicleKey::parse(year, make, model).expect("valid key");
        assert_eq!(
            state_counts(&by_one, &key).expect("query"),
            state_counts(&by_all, &key).expect("query"),
        );
    }
    assert_eq!(by_one.len().expect("len"), by_all.len().expect("len"));
}

#[test_log::test]
fn test_ingesting_twice_doubles_counts() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = GeoIndexConfig {
        input_path: write_dump(temp_dir.path()),
        db_path: temp_dir.path().join("geo.sqlite"),
        chunk_size: 3,
    };
    let store = GeoCountStore::open(&config.db_path).expect("open index");
    let builder = GeoIndexBuilder::new(config, &store).expect("valid config");
    builder.build(None).expect("first build");
    builder.build(None).expect("second build");

    let key = VehicleKey::parse("2020", "HONDA", "ACCORD").expect("valid key");
    assert_eq!(state_counts(&store, &key).expect("query"), vec![sc("CA", 4), sc("TX", 2)]);
}

#[test_log::test]
fn test_index_survives_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    drop(build(&temp_dir, 2));

    let store = GeoCountStore::open(&temp_dir.path().join("geo.sqlite")).expect("reopen");
    let key = VehicleKey::parse("2018", "Ford", "F-150").expect("valid key");
    let breakdown = StateBreakdown::resolve(Vec::new(), Some(&store), &key).expect("resolve");

    assert_eq!(breakdown.source, BreakdownSource::OfflineIndex);
    assert_eq!(breakdown.counts, vec![sc("TX", 2), sc("OK", 1)]);
    assert!(breakdown.is_concentrated());

    let json = serde_json::to_value(&breakdown).expect("serialize");
    assert_eq!(json["source"], "OfflineIndex");
    assert_eq!(json["counts"][0]["state"], "TX");
}
