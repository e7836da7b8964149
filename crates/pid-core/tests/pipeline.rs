use std::fs;
use std::path::{Path, PathBuf};

use pid_core::{ReconcileError, ReconcileInputs, assign_surveys, reconcile};
use pid_model::{CellValue, Coverage, MergeScope, ParticipantId, StudyConfig};
use tempfile::TempDir;

const DATA_RECORD: &str = "\
Participant ID,RS,Audio,School
AB1234,Y,,North
CD5678,,Y,South
EF9012,Y,Y,East
GH3456,,,West
";

const CN_EXPORT: &str = "\
StartDate,Progress,Duration (in seconds),Finished,Q2,Q5
Start Date,Progress,Duration,Finished,Consent,Participant ID
2023-07-01,100,300,True,Yes,ab1234
2023-07-01,100,310,True,Yes,EF9012
2023-07-01,100,200,True,No,AB-12
2023-07-01,50,20,False,,
2023-07-01,100,250,True,Yes,ZZ9999
";

const POST_EXPORT: &str = "\
Progress,Finished,Q1,Q2
Progress,Finished,PID,Enjoyed
100,True,EF9012,Yes
100,True, cd5678 ,No
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn fixture(dir: &Path) -> ReconcileInputs {
    ReconcileInputs {
        record: write(dir, "Data Record Sorted Out.csv", DATA_RECORD),
        // Listed out of order on purpose; surveys run in configuration order.
        questionnaires: vec![
            write(dir, "Post CN Questionnaire Results.csv", POST_EXPORT),
            write(dir, "CN Questionnaire Results.csv", CN_EXPORT),
        ],
    }
}

fn id(value: &str) -> ParticipantId {
    ParticipantId::new(value).expect("participant id")
}

#[test]
fn reconciles_both_surveys_into_data_record() {
    let dir = TempDir::new().expect("temp dir");
    let inputs = fixture(dir.path());
    let config = StudyConfig::default();

    let result = reconcile(&inputs, &config).expect("reconcile");

    assert_eq!(result.records.len(), 4);
    assert!(result.warnings.is_empty());

    let keys: Vec<&str> = result.surveys.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["CN", "POST"]);

    let cn = &result.surveys[0];
    assert_eq!(cn.partition.total, 5);
    assert_eq!(cn.partition.valid, 3);
    assert_eq!(cn.partition.missing, 1);
    assert_eq!(cn.partition.non_alphanumeric, 1);
    assert_eq!(cn.merge.incoming, 5);
    assert_eq!(cn.merge.matched, 2);
    assert_eq!(cn.merge.unmatched, 3);
    assert_eq!(cn.dropped_columns, vec!["StartDate"]);

    let post = &result.surveys[1];
    assert_eq!(post.partition.valid, 2);
    assert_eq!(post.merge.matched, 2);

    let rows = &result.records.records;
    assert_eq!(rows[0].get("CN.Q2").as_text(), Some("Yes"));
    assert_eq!(rows[0].get("CNProgress"), &CellValue::Integer(100));
    assert!(rows[0].get("PostProgress").is_missing());
    assert_eq!(rows[1].get("Post.Q2").as_text(), Some("No"));
    assert_eq!(rows[1].get("ParticipantID").as_text(), Some("CD5678"));
    assert_eq!(rows[2].get("CN.Q2").as_text(), Some("Yes"));
    assert_eq!(rows[2].get("Post.Q2").as_text(), Some("Yes"));
    assert_eq!(rows[2].get("PostFinished"), &CellValue::Boolean(true));
    assert!(rows[3].get("ParticipantID").is_missing());

    insta::assert_snapshot!(result.records.columns.join("\n"), @r"
    Participant ID
    RS
    Audio
    School
    CNProgress
    CNDuration (in seconds)
    CNFinished
    CN.Q2
    ParticipantID
    PostProgress
    PostFinished
    Post.Q2
    ");
}

#[test]
fn summaries_follow_merged_rows() {
    let dir = TempDir::new().expect("temp dir");
    let inputs = fixture(dir.path());
    let config = StudyConfig::default();

    let result = reconcile(&inputs, &config).expect("reconcile");

    let during = result.pid_format.row("During session").expect("cn row");
    assert_eq!((during.correct, during.incorrect), (3, 2));
    let percent = during.incorrect_percent.expect("percent");
    assert!((percent - 200.0 / 3.0).abs() < 1e-9);
    let after = result.pid_format.row("After session").expect("post row");
    assert_eq!(after.incorrect_percent, Some(0.0));

    let completion = &result.completion;
    assert_eq!(completion.get(Coverage::FirstOnly, Coverage::FirstOnly), 1);
    assert_eq!(completion.get(Coverage::SecondOnly, Coverage::SecondOnly), 1);
    assert_eq!(completion.get(Coverage::Both, Coverage::Both), 1);
    assert_eq!(completion.get(Coverage::Neither, Coverage::Neither), 1);
    assert_eq!(completion.total(), 4);
}

#[test]
fn valid_scope_still_matches_valid_identifiers() {
    let dir = TempDir::new().expect("temp dir");
    let inputs = fixture(dir.path());
    let mut config = StudyConfig::default();
    config.merge.scope = MergeScope::Valid;

    let result = reconcile(&inputs, &config).expect("reconcile");

    let cn = &result.surveys[0];
    assert_eq!(cn.merge.incoming, 3);
    assert_eq!(cn.merge.matched, 2);
    assert_eq!(cn.merge.unmatched, 1);
}

#[test]
fn duplicate_reference_ids_warn_or_fail() {
    let dir = TempDir::new().expect("temp dir");
    let mut inputs = fixture(dir.path());
    inputs.record = write(
        dir.path(),
        "Data Record.csv",
        "Participant ID,RS,Audio\nAB1234,Y,\nab1234,,Y\n",
    );
    let mut config = StudyConfig::default();

    let result = reconcile(&inputs, &config).expect("reconcile");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.records.records[0].get("CN.Q2").as_text(), Some("Yes"));
    assert!(result.records.records[1].get("CN.Q2").is_missing());

    config.merge.reject_duplicate_ids = true;
    let error = reconcile(&inputs, &config).expect_err("duplicates rejected");
    match error {
        ReconcileError::DuplicateReferenceId { id: repeated, rows } => {
            assert_eq!(repeated, id("AB1234"));
            assert_eq!(rows.len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_identifier_column_aborts_run() {
    let dir = TempDir::new().expect("temp dir");
    let mut inputs = fixture(dir.path());
    inputs.questionnaires[1] = write(
        dir.path(),
        "CN Questionnaire Results.csv",
        "Progress,Finished,Q2\nProgress,Finished,Consent\n100,True,Yes\n",
    );

    let error = reconcile(&inputs, &StudyConfig::default()).expect_err("schema error");
    assert!(error.is_schema_error());
    assert!(error.to_string().contains("'Q5'"));
}

#[test]
fn survey_assignment_requires_one_file_each() {
    let config = StudyConfig::default();
    let cn = PathBuf::from("CN Questionnaire Results.csv");
    let post = PathBuf::from("Post CN Questionnaire Results.csv");

    let assigned = assign_surveys(&[post.clone(), cn.clone()], &config).expect("assigned");
    let keys: Vec<&str> = assigned.iter().map(|(s, _)| s.key.as_str()).collect();
    assert_eq!(keys, vec!["CN", "POST"]);
    assert_eq!(assigned[0].1, cn);

    let error = assign_surveys(std::slice::from_ref(&cn), &config).expect_err("missing post");
    assert!(matches!(error, ReconcileError::MissingSurvey { ref key } if key == "POST"));

    let error = assign_surveys(&[cn.clone(), PathBuf::from("CN copy.csv"), post], &config)
        .expect_err("two cn files");
    assert!(matches!(error, ReconcileError::DuplicateSurvey { ref key, .. } if key == "CN"));
}
