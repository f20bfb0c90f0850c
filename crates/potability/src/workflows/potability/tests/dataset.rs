use serde_json::{json, Value};

use crate::workflows::potability::dataset::{
    accept_file, sample_dataset, to_csv, Dataset, DatasetError, DatasetLoader, FileFormat,
    ParseError, Record,
};

fn string_record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect()
}

fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("potability-{}-{}", std::process::id(), name))
}

#[test]
fn exported_csv_reimports_to_the_same_records() {
    let dataset = Dataset::new(vec![
        string_record(&[("site", "Well 4"), ("ph", "7.1"), ("turbidity", "0.8")]),
        string_record(&[("site", "Reservoir"), ("ph", "6.4"), ("turbidity", "")]),
        string_record(&[("site", "Tap"), ("ph", "8.0"), ("turbidity", "1.2")]),
    ]);

    let csv = to_csv(&dataset).expect("exports");
    let reimported = accept_file(csv.as_bytes(), "csv").expect("reimports");

    assert_eq!(reimported, dataset);
    assert_eq!(reimported.columns(), vec!["site", "ph", "turbidity"]);
}

#[test]
fn sample_dataset_round_trips_through_csv() {
    let dataset = sample_dataset();
    let csv = to_csv(&dataset).expect("exports");

    assert!(csv.starts_with(
        "ph,hardness,solids,chloramines,sulfate,conductivity,organic_carbon,trihalomethanes,turbidity\n"
    ));
    assert_eq!(accept_file(csv.as_bytes(), ".csv").expect("reimports"), dataset);
}

#[test]
fn backslashes_inside_values_survive_a_round_trip() {
    let dataset = Dataset::new(vec![
        string_record(&[("site", "C:\\data\\wells"), ("ph", "7.5")]),
        string_record(&[("site", "north\\south"), ("ph", "6.8")]),
    ]);

    let csv = to_csv(&dataset).expect("exports");
    let reimported = accept_file(csv.as_bytes(), "csv").expect("reimports");

    assert_eq!(reimported, dataset);
}

#[test]
fn trailing_backslash_reads_as_literal_before_the_closing_quote() {
    let dataset = Dataset::new(vec![
        string_record(&[("site", "C:\\data\\"), ("ph", "7.5")]),
        string_record(&[("site", "b"), ("ph", "6.8\\")]),
    ]);

    let csv = to_csv(&dataset).expect("exports");
    assert!(csv.contains("\"C:\\data\\\",\"7.5\""));

    let reimported = accept_file(csv.as_bytes(), "csv").expect("reimports");
    assert_eq!(reimported, dataset);
}

#[test]
fn escaped_quote_before_a_comma_is_read_as_a_cell_end() {
    let dataset = Dataset::new(vec![string_record(&[
        ("note", "say \"hi\", then"),
        ("ph", "7.0"),
    ])]);

    let csv = to_csv(&dataset).expect("exports");
    let reimported = accept_file(csv.as_bytes(), "csv").expect("still parses");

    assert_eq!(reimported.records()[0]["note"], json!("say \"hi\\"));
    assert_ne!(reimported, dataset);
}

#[test]
fn rows_of_bare_commas_are_kept_as_empty_records() {
    let dataset = accept_file(b"ph,hardness\n,\n7,8\n", "csv").expect("parses");

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[0]["ph"], json!(""));
    assert_eq!(dataset.records()[0]["hardness"], json!(""));
    assert_eq!(dataset.records()[1]["hardness"], json!("8"));
}

#[test]
fn sample_dataset_has_two_rows() {
    let dataset = sample_dataset();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[0]["ph"], json!("7.5"));
    assert_eq!(dataset.records()[1]["turbidity"], json!("3.2"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let contents: [&[u8]; 3] = [b"[{\"ph\": 7.5,", b"not json at all", b""];
    for content in contents {
        match accept_file(content, "json") {
            Err(DatasetError::Parse(ParseError { format, .. })) => {
                assert_eq!(format, FileFormat::Json)
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}

#[test]
fn json_uploads_keep_numeric_values() {
    let dataset = accept_file(
        br#"[{"ph": 7.5, "hardness": 200}, {"ph": "6.8", "hardness": null}]"#,
        "readings.JSON",
    )
    .expect("json parses");

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[0]["ph"], json!(7.5));
    assert_eq!(dataset.records()[1]["hardness"], Value::Null);
}

#[test]
fn unknown_extensions_are_rejected() {
    let error = accept_file(b"ph\n7", "xlsx").expect_err("unsupported");
    assert!(matches!(error, DatasetError::UnsupportedFormat(ext) if ext == "xlsx"));
}

#[test]
fn file_format_detection_accepts_names_and_bare_extensions() {
    assert_eq!(FileFormat::from_extension("csv"), Some(FileFormat::Csv));
    assert_eq!(FileFormat::from_extension(".CSV"), Some(FileFormat::Csv));
    assert_eq!(FileFormat::from_extension("batch.2026.json"), Some(FileFormat::Json));
    assert_eq!(FileFormat::from_extension("notes.txt"), None);
    assert_eq!(FileFormat::from_extension(""), None);
}

#[tokio::test]
async fn loader_reads_files_from_disk() {
    let path = scratch_path("loader.csv");
    tokio::fs::write(&path, "ph,hardness\n7.2,210\n")
        .await
        .expect("write fixture");

    let loader = DatasetLoader::new();
    let dataset = loader.load_path(&path).await.expect("loads");
    let _ = tokio::fs::remove_file(&path).await;

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records()[0]["hardness"], json!("210"));
}

#[tokio::test]
async fn loader_serializes_concurrent_reads() {
    let first = scratch_path("first.json");
    let second = scratch_path("second.json");
    tokio::fs::write(&first, r#"[{"ph": "7.0"}]"#)
        .await
        .expect("write fixture");
    tokio::fs::write(&second, r#"[{"ph": "8.0"}, {"ph": "8.1"}]"#)
        .await
        .expect("write fixture");

    let loader = DatasetLoader::new();
    let (a, b) = tokio::join!(loader.load_path(&first), loader.load_path(&second));
    let _ = tokio::fs::remove_file(&first).await;
    let _ = tokio::fs::remove_file(&second).await;

    assert_eq!(a.expect("first loads").len(), 1);
    assert_eq!(b.expect("second loads").len(), 2);
}

#[tokio::test]
async fn loader_surfaces_missing_files_as_io_errors() {
    let loader = DatasetLoader::new();
    let error = loader
        .load_path(scratch_path("does-not-exist.csv"))
        .await
        .expect_err("missing file");

    match error {
        DatasetError::Io(_) => {}
        other => panic!("expected io error, got {other:?}"),
    }
}

#[tokio::test]
async fn loader_rejects_unsupported_files_before_reading() {
    let loader = DatasetLoader::new();
    let error = loader
        .load_path(scratch_path("does-not-exist.xlsx"))
        .await
        .expect_err("unsupported");

    assert!(matches!(error, DatasetError::UnsupportedFormat(_)));
}
