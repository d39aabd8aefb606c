use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use pulseboard::{
    CsvFileSource, Dataset, DatasetCache, DatasetSource, FieldValue, InMemorySource,
};

fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn loads_typed_cells_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "survey.csv",
        "Identifier,Date,Monthly Income,Notes\n\
         p1,2025-01-10,1200.5,steady\n\
         p2,01/15/2025,,\n",
    );
    let source = CsvFileSource::new("survey", path).with_date_columns(["Date"]);
    let dataset = source.load().unwrap();

    assert_eq!(dataset.len(), 2);
    let first = dataset.row(0).unwrap();
    assert_eq!(
        first.date("Date"),
        NaiveDate::from_ymd_opt(2025, 1, 10)
    );
    assert_eq!(first.number("Monthly Income"), Some(1200.5));
    assert_eq!(first.text("Notes"), Some("steady"));

    // Date columns accept more than one calendar format.
    let second = dataset.row(1).unwrap();
    assert_eq!(
        second.date("Date"),
        NaiveDate::from_ymd_opt(2025, 1, 15)
    );
    assert!(second.get("Monthly Income").unwrap().is_missing());
}

#[test]
fn malformed_rows_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "ragged.csv",
        "Identifier,Score\n\
         p1,4\n\
         p2,5,extra,fields\n\
         p3,3\n",
    );
    let dataset = CsvFileSource::new("ragged", path).load().unwrap();
    assert_eq!(dataset.len(), 2);
    let ids: Vec<&str> = dataset
        .rows()
        .filter_map(|row| row.text("Identifier"))
        .collect();
    assert_eq!(ids, vec!["p1", "p3"]);
}

#[test]
fn missing_file_reports_the_source_id() {
    let source = CsvFileSource::new("ghost", "/nonexistent/ghost.csv");
    let err = source.load().unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn cache_serves_the_previous_snapshot_when_a_reload_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "volatile.csv", "Identifier\np1\np2\n");
    let source = CsvFileSource::new("volatile", path.clone());

    let cache = DatasetCache::new();
    let snapshot = cache.refresh(&source).unwrap();
    assert_eq!(snapshot.dataset.len(), 2);

    std::fs::remove_file(&path).unwrap();
    let fallback = cache.refresh(&source).unwrap();
    assert_eq!(fallback.dataset.len(), 2);
    assert_eq!(fallback.loaded_at, snapshot.loaded_at);
}

#[test]
fn invalidation_forces_the_next_snapshot_to_reload() {
    let first = Dataset::from_rows(["Identifier"], vec![vec![FieldValue::Text("p1".into())]])
        .unwrap();
    let source = InMemorySource::new("memory", first);

    let cache = DatasetCache::with_ttl(chrono::Duration::seconds(3600));
    let before = cache.snapshot(&source).unwrap();
    assert!(!cache.is_stale());

    cache.invalidate();
    assert!(cache.is_stale());
    let after = cache.snapshot(&source).unwrap();
    assert!(after.loaded_at >= before.loaded_at);
    assert!(!cache.is_stale());

    // A snapshot taken inside the TTL is served from the cache.
    let cached = cache.snapshot(&source).unwrap();
    assert_eq!(cached.loaded_at, after.loaded_at);
}
