//! End-to-end registry scenarios: load, transform, save, and the
//! no-mutation-on-failure guarantees.

use std::fs;
use std::io::Write;

use polars::prelude::*;
use tempfile::TempDir;

use tabula_core::{
    col, lit, AggregateFunction, Aggregation, FileFormat, JoinKind, RegistryError, TableRegistry,
};

fn write_sample_csv(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("a.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "id,amount").unwrap();
    writeln!(file, "1,100").unwrap();
    writeln!(file, "2,250").unwrap();
    writeln!(file, "3,40").unwrap();
    file.flush().unwrap();
    path
}

#[test]
fn not_found_operations_leave_tables_unchanged() {
    let dir = TempDir::new().unwrap();
    let csv = write_sample_csv(&dir);

    let mut registry = TableRegistry::new();
    registry.load_csv("t1", &csv).unwrap();
    let before = registry.table("t1").unwrap().clone();

    let missing = "no_such_table";
    assert!(matches!(
        registry.filter_table(missing, &col("amount").gt(lit(1i64))),
        Err(RegistryError::TableNotFound(_))
    ));
    assert!(matches!(
        registry.join_tables(missing, "t1", &["id"], JoinKind::Inner, "out"),
        Err(RegistryError::TableNotFound(_))
    ));
    assert!(matches!(
        registry.join_tables("t1", missing, &["id"], JoinKind::Inner, "out"),
        Err(RegistryError::TableNotFound(_))
    ));
    assert!(matches!(
        registry.aggregate_table(
            missing,
            &["id"],
            &[Aggregation::new("amount", AggregateFunction::Sum)],
            "out",
        ),
        Err(RegistryError::TableNotFound(_))
    ));
    assert!(matches!(
        registry.save_table(missing, dir.path().join("x.csv"), FileFormat::Csv),
        Err(RegistryError::TableNotFound(_))
    ));

    // No key added, none removed, the existing table untouched.
    assert_eq!(registry.table_names(), vec!["t1"]);
    assert!(registry.table("t1").unwrap().equals(&before));
}

#[test]
fn csv_round_trip_preserves_rows_and_columns() {
    let dir = TempDir::new().unwrap();
    let csv = write_sample_csv(&dir);

    let mut registry = TableRegistry::new();
    registry.load_csv("t1", &csv).unwrap();

    let saved = dir.path().join("saved.csv");
    registry.save_table("t1", &saved, FileFormat::Csv).unwrap();
    registry.load_csv("t2", &saved).unwrap();

    let original = registry.table("t1").unwrap();
    let reloaded = registry.table("t2").unwrap();
    assert!(reloaded.equals(original));
}

#[test]
fn loading_twice_overwrites_instead_of_duplicating() {
    let dir = TempDir::new().unwrap();
    let csv = write_sample_csv(&dir);

    let mut registry = TableRegistry::new();
    registry.load_csv("t1", &csv).unwrap();
    let once = registry.table("t1").unwrap().clone();

    registry.load_csv("t1", &csv).unwrap();
    let twice = registry.table("t1").unwrap();

    assert_eq!(registry.table_names(), vec!["t1"]);
    assert!(twice.equals(&once));
}

#[test]
fn csv_to_json_produces_matching_records() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let csv = write_sample_csv(&dir);

    let mut registry = TableRegistry::new();
    registry.load_csv("t1", &csv)?;

    let out = dir.path().join("out.json");
    registry.save_table("t1", &out, FileFormat::Json)?;

    let text = fs::read_to_string(&out)?;
    let parsed: serde_json::Value = serde_json::from_str(&text)?;
    let records = parsed.as_array().expect("expected a JSON array");

    assert_eq!(records.len(), 3);
    for record in records {
        assert!(record.get("id").is_some());
        assert!(record.get("amount").is_some());
    }
    assert_eq!(records[0]["id"], serde_json::json!(1));
    assert_eq!(records[0]["amount"], serde_json::json!(100));
    assert_eq!(records[2]["amount"], serde_json::json!(40));
    Ok(())
}

#[test]
fn combine_skips_absent_names() {
    let dir = TempDir::new().unwrap();
    let csv = write_sample_csv(&dir);

    let mut registry = TableRegistry::new();
    registry.load_csv("t1", &csv).unwrap();

    registry.combine_tables(&["missing", "t1"], "c1").unwrap();

    assert_eq!(registry.table("c1").unwrap().height(), 3);
}

#[test]
fn excel_load_save_round_trip() {
    let dir = TempDir::new().unwrap();
    let csv = write_sample_csv(&dir);

    let mut registry = TableRegistry::new();
    registry.load_csv("t1", &csv).unwrap();

    let xlsx = dir.path().join("out.xlsx");
    registry.save_table("t1", &xlsx, FileFormat::Excel).unwrap();
    registry
        .load_excel("t1_back", &xlsx, Default::default())
        .unwrap();

    let reloaded = registry.table("t1_back").unwrap();
    assert_eq!(reloaded.height(), 3);
    assert_eq!(reloaded.width(), 2);
}

#[test]
fn database_query_and_writeback() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("example.db");
    let descriptor = format!("sqlite://{}", db_path.display());

    let mut registry = TableRegistry::new();
    registry.register_connection("db1", &descriptor).unwrap();

    // Seed the database through the registry itself.
    let seed = df!(
        "id" => &[1i64, 2],
        "name" => &["alice", "bob"]
    )
    .unwrap();
    let csv = dir.path().join("seed.csv");
    {
        let mut frame = seed.clone();
        let file = fs::File::create(&csv).unwrap();
        CsvWriter::new(file).finish(&mut frame).unwrap();
    }
    registry.load_csv("people", &csv).unwrap();
    registry
        .save_table_to_database("people", "db1", "people")
        .unwrap();

    registry
        .query_database("db1", "SELECT * FROM people WHERE id = 2", "bob_only")
        .unwrap();

    let frame = registry.table("bob_only").unwrap();
    assert_eq!(frame.height(), 1);
    let names: Vec<String> = frame
        .column("name")
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, vec!["bob"]);
}

#[test]
fn unreadable_csv_propagates_and_stores_nothing() {
    let mut registry = TableRegistry::new();
    let error = registry
        .load_csv("t1", "/definitely/not/here.csv")
        .unwrap_err();
    assert!(matches!(error, RegistryError::Polars(_)));
    assert!(registry.table_names().is_empty());
}
