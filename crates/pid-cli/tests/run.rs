//! End-to-end runs of the `run` command against fixture exports.

use std::fs;
use std::path::{Path, PathBuf};

use pid_cli::commands::run_reconcile;
use pid_cli::types::RunOptions;
use pid_model::OutputFormat;
use pid_report::{COMPLETION_FILE, DATA_RECORD_FILE, JSON_REPORT_FILE, PID_FORMAT_FILE};
use tempfile::TempDir;

const DATA_RECORD: &str = "\
Participant ID,RS,Audio
AB1234,Y,Y
CD5678,Y,
EF9012,,
";

const CN_EXPORT: &str = "\
StartDate,Progress,Duration (in seconds),Finished,Q2,Q5
Start Date,Progress,Duration,Finished,Hair,Participant ID
2023-07-01,100,300,True,IM_7NzSARqhuHLQW1M,ab1234
2023-07-01,100,280,True,IM_other,CD5678
2023-07-01,100,200,True,IM_other,AB-12
";

const POST_EXPORT: &str = "\
Progress,Finished,Q1,Q2
Progress,Finished,PID,Enjoyed
100,True,AB1234,Yes
";

const STUDY_CONFIG: &str = r#"
[output]
value_map = "hair_types.csv"
formats = ["csv", "json"]

[[surveys]]
key = "CN"
phase_label = "During session"
id_column = "Q5"
field_prefix = "CN"
labels = "cn_labels.csv"

[[surveys]]
key = "POST"
phase_label = "After session"
id_column = "Q1"
field_prefix = "Post"
file_pattern = "Post"
labels = "post_labels.csv"
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn exports(dir: &Path) -> PathBuf {
    let exports = dir.join("exports");
    fs::create_dir(&exports).expect("create exports");
    write(&exports, "CN Questionnaire Results.csv", CN_EXPORT);
    write(&exports, "Post CN Questionnaire Results.csv", POST_EXPORT);
    exports
}

#[test]
fn writes_report_next_to_data_record() {
    let dir = TempDir::new().expect("temp dir");
    let exports = exports(dir.path());
    let options = RunOptions {
        record: write(dir.path(), "Data Record.csv", DATA_RECORD),
        questionnaires: vec![
            exports.join("CN Questionnaire Results.csv"),
            exports.join("Post CN Questionnaire Results.csv"),
        ],
        ..RunOptions::default()
    };

    let result = run_reconcile(&options).expect("run");

    let output = dir.path().join("output");
    assert_eq!(result.output_dir, output);
    assert_eq!(result.outputs.len(), 3);
    for name in [DATA_RECORD_FILE, PID_FORMAT_FILE, COMPLETION_FILE] {
        assert!(output.join(name).is_file(), "{name} missing");
    }
    let pid_format = fs::read_to_string(output.join(PID_FORMAT_FILE)).expect("read");
    assert!(pid_format.contains("During session,2,1,50.00"));
    assert!(pid_format.contains("After session,1,0,0.00"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let options = RunOptions {
        record: write(dir.path(), "Data Record.csv", DATA_RECORD),
        questionnaire_dir: Some(exports(dir.path())),
        dry_run: true,
        ..RunOptions::default()
    };

    let result = run_reconcile(&options).expect("run");

    assert!(result.outputs.is_empty());
    assert!(!dir.path().join("output").exists());
    assert_eq!(result.reconciliation.surveys.len(), 2);
    assert_eq!(result.reconciliation.surveys[0].merge.matched, 2);
}

#[test]
fn configuration_labels_and_value_map_shape_output() {
    let dir = TempDir::new().expect("temp dir");
    let config_dir = dir.path().join("config");
    fs::create_dir(&config_dir).expect("create config dir");
    write(&config_dir, "cn_labels.csv", "code,label\nQ2,Hair type\n");
    write(&config_dir, "post_labels.csv", "code,label\nQ2,Enjoyed session\n");
    write(
        &config_dir,
        "hair_types.csv",
        "value,replacement\nIM_7NzSARqhuHLQW1M,21_A\n",
    );
    let output_dir = dir.path().join("report");
    let options = RunOptions {
        record: write(dir.path(), "Data Record.csv", DATA_RECORD),
        questionnaire_dir: Some(exports(dir.path())),
        config: Some(write(&config_dir, "study.toml", STUDY_CONFIG)),
        output_dir: Some(output_dir.clone()),
        ..RunOptions::default()
    };

    let result = run_reconcile(&options).expect("run");

    assert_eq!(result.renamed_columns, 2);
    assert_eq!(result.replaced_values, 1);
    assert!(output_dir.join(JSON_REPORT_FILE).is_file());
    let data = fs::read_to_string(output_dir.join(DATA_RECORD_FILE)).expect("read");
    let header = data.lines().next().expect("header");
    assert!(header.contains("Hair type"));
    assert!(header.contains("Enjoyed session"));
    assert!(!header.contains("CN.Q2"));
    assert!(data.contains("21_A"));
}

#[test]
fn format_flag_overrides_configuration() {
    let dir = TempDir::new().expect("temp dir");
    let options = RunOptions {
        record: write(dir.path(), "Data Record.csv", DATA_RECORD),
        questionnaire_dir: Some(exports(dir.path())),
        formats: Some(vec![OutputFormat::Json]),
        ..RunOptions::default()
    };

    let result = run_reconcile(&options).expect("run");

    assert_eq!(result.outputs, vec![dir.path().join("output").join(JSON_REPORT_FILE)]);
}

#[test]
fn missing_identifier_column_fails_without_output() {
    let dir = TempDir::new().expect("temp dir");
    let broken = write(
        dir.path(),
        "CN Questionnaire Results.csv",
        "Progress,Finished,Q2\nProgress,Finished,Hair\n100,True,x\n",
    );
    let options = RunOptions {
        record: write(dir.path(), "Data Record.csv", DATA_RECORD),
        questionnaires: vec![
            broken,
            write(dir.path(), "Post Results.csv", POST_EXPORT),
        ],
        ..RunOptions::default()
    };

    let error = run_reconcile(&options).expect_err("schema error");

    assert!(format!("{error:#}").contains("Q5"));
    assert!(!dir.path().join("output").exists());
}

#[test]
fn shipped_study_configuration_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/study.toml");
    let options = RunOptions {
        config: Some(path),
        ..RunOptions::default()
    };

    let config = pid_cli::commands::resolve_config(&options).expect("config");
    let presentation = pid_report::Presentation::load(&config).expect("lookup tables");

    assert_eq!(config.surveys.len(), 2);
    assert_eq!(config.output.formats, vec![OutputFormat::Csv, OutputFormat::Json]);
    assert!(presentation.labels.contains_key("CN"));
    assert!(presentation.labels.contains_key("POST"));
    assert!(presentation.value_map.is_some());
}
