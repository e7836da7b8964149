//! Atomic emission of the report tables.
//!
//! Every requested file is written into a staging directory inside the
//! output directory and moved into place only once all of them succeeded.
//! The staged files replace the previous report set as a whole: earlier
//! report files are moved aside first, restored if any move fails, and
//! discarded with the staging directory otherwise.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use chrono::Utc;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use pid_core::{Reconciliation, SurveyOutcome};
use pid_model::{CellValue, MergeWarning, OutputFormat, PidFormatRow};

use crate::frames::{completion_frame, pid_format_frame, records_frame};

pub const DATA_RECORD_FILE: &str = "data_record.csv";
pub const PID_FORMAT_FILE: &str = "pid_format.csv";
pub const COMPLETION_FILE: &str = "completion.csv";
pub const JSON_REPORT_FILE: &str = "participant_completion.json";

const REPORT_FILES: [&str; 4] = [
    DATA_RECORD_FILE,
    PID_FORMAT_FILE,
    COMPLETION_FILE,
    JSON_REPORT_FILE,
];

const REPORT_SCHEMA: &str = "participant-completion-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    data_record: JsonTable<'a>,
    pid_format: &'a [PidFormatRow],
    completion: JsonCompletion,
    surveys: Vec<JsonSurvey>,
    warnings: &'a [MergeWarning],
}

#[derive(Debug, Serialize)]
struct JsonTable<'a> {
    columns: &'a [String],
    rows: Vec<Vec<&'a CellValue>>,
}

#[derive(Debug, Serialize)]
struct JsonCompletion {
    rows: [String; 4],
    columns: [String; 4],
    counts: [[usize; 4]; 4],
}

#[derive(Debug, Serialize)]
struct JsonSurvey {
    key: String,
    phase: String,
    source: String,
    records: usize,
    valid: usize,
    missing: usize,
    wrong_length: usize,
    non_alphanumeric: usize,
    matched: usize,
    unmatched: usize,
    repeated: usize,
}

impl From<&SurveyOutcome> for JsonSurvey {
    fn from(outcome: &SurveyOutcome) -> Self {
        Self {
            key: outcome.key.clone(),
            phase: outcome.phase_label.clone(),
            source: outcome.path.display().to_string(),
            records: outcome.partition.total,
            valid: outcome.partition.valid,
            missing: outcome.partition.missing,
            wrong_length: outcome.partition.wrong_length,
            non_alphanumeric: outcome.partition.non_alphanumeric,
            matched: outcome.merge.matched,
            unmatched: outcome.merge.unmatched,
            repeated: outcome.merge.repeated,
        }
    }
}

/// Write the requested formats into `output_dir`. Returns the final paths.
///
/// Report files left by an earlier run are removed, including those of
/// formats not requested this time.
pub fn write_outputs(
    output_dir: &Path,
    reconciliation: &Reconciliation,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>> {
    let span = info_span!("output", output_dir = %output_dir.display());
    let _guard = span.enter();
    let start = Instant::now();
    ensure!(!formats.is_empty(), "no output format requested");

    fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;
    let staging = tempfile::Builder::new()
        .prefix(".participant-completion-")
        .tempdir_in(output_dir)
        .with_context(|| format!("create staging directory in {}", output_dir.display()))?;

    let formats: BTreeSet<OutputFormat> = formats.iter().copied().collect();
    let mut staged: Vec<&'static str> = Vec::new();
    for format in &formats {
        match format {
            OutputFormat::Csv => {
                write_csv(
                    &staging.path().join(DATA_RECORD_FILE),
                    records_frame(&reconciliation.records)?,
                )?;
                write_csv(
                    &staging.path().join(PID_FORMAT_FILE),
                    pid_format_frame(&reconciliation.pid_format)?,
                )?;
                write_csv(
                    &staging.path().join(COMPLETION_FILE),
                    completion_frame(&reconciliation.completion)?,
                )?;
                staged.extend([DATA_RECORD_FILE, PID_FORMAT_FILE, COMPLETION_FILE]);
            }
            OutputFormat::Json => {
                write_json(&staging.path().join(JSON_REPORT_FILE), reconciliation)?;
                staged.push(JSON_REPORT_FILE);
            }
        }
    }

    let outputs = publish(staging.path(), output_dir, &staged)?;
    staging.close().context("remove staging directory")?;

    info!(
        files = outputs.len(),
        duration_ms = start.elapsed().as_millis(),
        "outputs written"
    );
    Ok(outputs)
}

/// Swap the staged files in for the previous report set.
fn publish(staging: &Path, output_dir: &Path, staged: &[&'static str]) -> Result<Vec<PathBuf>> {
    let previous = staging.join("previous");
    fs::create_dir(&previous).context("create backup directory")?;

    let mut displaced = Vec::new();
    let mut outputs = Vec::with_capacity(staged.len());
    let swapped = swap_in(
        staging,
        output_dir,
        staged,
        &previous,
        &mut displaced,
        &mut outputs,
    );
    if let Err(error) = swapped {
        roll_back(output_dir, &previous, &displaced, &outputs);
        return Err(error);
    }
    debug!(
        replaced = displaced.len(),
        written = outputs.len(),
        "report set published"
    );
    Ok(outputs)
}

fn swap_in(
    staging: &Path,
    output_dir: &Path,
    staged: &[&'static str],
    previous: &Path,
    displaced: &mut Vec<&'static str>,
    outputs: &mut Vec<PathBuf>,
) -> Result<()> {
    for name in REPORT_FILES {
        let target = output_dir.join(name);
        if target.is_file() {
            fs::rename(&target, previous.join(name))
                .with_context(|| format!("move earlier {name} aside"))?;
            displaced.push(name);
        }
    }
    for &name in staged {
        let target = output_dir.join(name);
        fs::rename(staging.join(name), &target)
            .with_context(|| format!("move {name} into {}", output_dir.display()))?;
        debug!(path = %target.display(), "output written");
        outputs.push(target);
    }
    Ok(())
}

fn roll_back(output_dir: &Path, previous: &Path, displaced: &[&'static str], outputs: &[PathBuf]) {
    for path in outputs {
        if let Err(error) = fs::remove_file(path) {
            warn!(path = %path.display(), %error, "could not remove partial output");
        }
    }
    for name in displaced {
        if let Err(error) = fs::rename(previous.join(name), output_dir.join(name)) {
            warn!(file = *name, %error, "could not restore earlier output");
        }
    }
}

fn write_csv(path: &Path, mut frame: DataFrame) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn write_json(path: &Path, reconciliation: &Reconciliation) -> Result<()> {
    let records = &reconciliation.records;
    let completion = &reconciliation.completion;
    let payload = JsonReport {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        data_record: JsonTable {
            columns: &records.columns,
            rows: records
                .iter()
                .map(|record| {
                    records
                        .columns
                        .iter()
                        .map(|column| record.get(column))
                        .collect()
                })
                .collect(),
        },
        pid_format: &reconciliation.pid_format.rows,
        completion: JsonCompletion {
            rows: completion.row_labels(),
            columns: completion.column_labels(),
            counts: completion.counts,
        },
        surveys: reconciliation.surveys.iter().map(JsonSurvey::from).collect(),
        warnings: &reconciliation.warnings,
    };
    let json = serde_json::to_string_pretty(&payload).context("serialize report")?;
    fs::write(path, format!("{json}\n")).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
