//! Tests for questionnaire export and data record loading.

use std::fs;
use std::path::{Path, PathBuf};

use pid_ingest::{IngestError, load_master_table, load_questionnaire};
use pid_model::{CellValue, StudyConfig};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

const CN_EXPORT: &str = "\
StartDate,EndDate,Status,Progress,Duration (in seconds),Finished,ResponseId,Q2,Q5,Q6,
Start Date,End Date,Response Type,Progress,Duration,Finished,Response ID,Consent,Participant ID,Ethnicity,
2023-07-01,2023-07-01,IP Address,100,312,True,R_1,Yes, ab1234 ,White,
2023-07-01,2023-07-01,IP Address,45,80,False,R_2,Yes,,Asian,
,,,,,,,,,,
2023-07-02,2023-07-02,IP Address,100.0,290,1,R_3,No,nan,Other,
";

#[test]
fn loads_cn_export_with_renamed_fields() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "CN Questionnaire Results.csv", CN_EXPORT);
    let config = StudyConfig::default();
    let survey = config.survey("CN").expect("cn survey");

    let export = load_questionnaire(&path, survey, &config.questionnaire).expect("load");

    assert_eq!(export.survey_key, "CN");
    assert_eq!(export.records.len(), 3);
    assert_eq!(
        export.records.columns,
        vec![
            "CNProgress",
            "CNDuration (in seconds)",
            "CNFinished",
            "CN.Q2",
            "ParticipantID",
            "CN.Q6",
        ]
    );
    assert_eq!(
        export.dropped_columns,
        vec!["StartDate", "EndDate", "Status", "ResponseId", ""]
    );

    let first = &export.records.records[0];
    assert_eq!(first.get("ParticipantID"), &CellValue::Text("AB1234".to_string()));
    assert_eq!(first.get("CNProgress"), &CellValue::Integer(100));
    assert_eq!(first.get("CNFinished"), &CellValue::Boolean(true));
    assert_eq!(first.get("CN.Q2"), &CellValue::Text("Yes".to_string()));
    assert!(first.get("StartDate").is_missing());

    let blank_id = &export.records.records[1];
    assert!(blank_id.get("ParticipantID").is_missing());
    assert_eq!(blank_id.get("CNFinished"), &CellValue::Boolean(false));

    let sentinel = &export.records.records[2];
    assert!(sentinel.get("ParticipantID").is_missing());
    assert_eq!(sentinel.get("CNProgress"), &CellValue::Integer(100));
    assert_eq!(sentinel.row.index(), 2);
}

#[test]
fn missing_identifier_column_is_schema_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "Post CN Questionnaire Results.csv",
        "Progress,Finished,Q2\nProgress,Finished,Heard of EEG\n100,True,Yes\n",
    );
    let config = StudyConfig::default();
    let survey = config.survey("POST").expect("post survey");

    let error = load_questionnaire(&path, survey, &config.questionnaire).expect_err("schema");
    match error {
        IngestError::MissingColumn { column, path: reported } => {
            assert_eq!(column, "Q1");
            assert_eq!(reported, path);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unparseable_progress_is_kept_as_text() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "Post.csv",
        "Q1,Progress,Finished\nPID,Progress,Finished\nCD5678,done,maybe\n",
    );
    let config = StudyConfig::default();
    let survey = config.survey("POST").expect("post survey");

    let export = load_questionnaire(&path, survey, &config.questionnaire).expect("load");
    let record = &export.records.records[0];
    assert_eq!(record.get("PostProgress"), &CellValue::Text("done".to_string()));
    assert_eq!(record.get("PostFinished"), &CellValue::Text("maybe".to_string()));
}

#[test]
fn duplicate_header_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "dup.csv", "Q1,Progress,Finished,Q1\n\n");
    let config = StudyConfig::default();
    let survey = config.survey("POST").expect("post survey");

    let error = load_questionnaire(&path, survey, &config.questionnaire).expect_err("dup");
    assert!(matches!(error, IngestError::DuplicateColumn { .. }));
}

#[test]
fn loads_data_record_with_canonical_ids() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "Data Record.csv",
        "Participant ID,RS,Audio,School\n ab1234,Y,,North\nCD5678,,Y,South\n,,,East\n",
    );
    let config = StudyConfig::default();

    let records = load_master_table(&path, &config.master).expect("load");

    assert_eq!(records.columns, vec!["Participant ID", "RS", "Audio", "School"]);
    assert_eq!(records.len(), 3);
    assert_eq!(
        records.records[0].get("Participant ID"),
        &CellValue::Text("AB1234".to_string())
    );
    assert!(records.records[0].get("Audio").is_missing());
    assert!(records.records[2].get("Participant ID").is_missing());
}

#[test]
fn data_record_without_id_column_is_schema_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "Data Record.csv", "PID,RS\nAB1234,Y\n");
    let config = StudyConfig::default();

    let error = load_master_table(&path, &config.master).expect_err("schema");
    assert!(error.is_schema_error());
    assert!(error.to_string().contains("Participant ID"));
}

#[test]
fn empty_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "empty.csv", "");
    let config = StudyConfig::default();

    let error = load_master_table(&path, &config.master).expect_err("empty");
    assert!(matches!(error, IngestError::EmptyCsv { .. }));
}
