//! Identifier-format and completion summaries.

use tracing::debug;

use pid_model::{
    CellValue, CompletionSummary, Coverage, ModelError, PidFormatRow, PidFormatSummary, Record,
    RecordSet, StudyConfig,
};

use crate::partition::RecordPartition;

/// Survey progress value meaning the questionnaire was completed.
pub const COMPLETE_PROGRESS: i64 = 100;

/// One row per survey phase: valid identifiers count as correct, everything
/// else (including missing identifiers) as incorrect.
pub fn summarize_pid_format<'a>(
    phases: impl IntoIterator<Item = (&'a str, &'a RecordPartition)>,
) -> PidFormatSummary {
    PidFormatSummary {
        rows: phases
            .into_iter()
            .map(|(phase, partition)| {
                PidFormatRow::new(phase, partition.valid.len(), partition.invalid.len())
            })
            .collect(),
    }
}

/// Cross-tabulate task coverage against survey coverage over merged rows.
///
/// A task counts as done when its column holds the configured marker and as
/// not done when the cell is missing. A survey counts as done at progress 100
/// and as not done when progress is missing. Rows with any other value (a
/// different marker, partial progress) fit no category and are left out.
///
/// # Errors
///
/// Returns [`ModelError::InvalidConfig`] unless the configuration names
/// exactly two task columns and two surveys.
pub fn summarize_completion(
    records: &RecordSet,
    config: &StudyConfig,
) -> Result<CompletionSummary, ModelError> {
    let [first_task, second_task] = config.master.tasks.as_slice() else {
        return Err(ModelError::InvalidConfig(format!(
            "completion summary needs exactly 2 task columns, found {}",
            config.master.tasks.len()
        )));
    };
    let [first_survey, second_survey] = config.surveys.as_slice() else {
        return Err(ModelError::InvalidConfig(format!(
            "completion summary needs exactly 2 surveys, found {}",
            config.surveys.len()
        )));
    };
    let mut summary = CompletionSummary::new(
        [first_task.key.clone(), second_task.key.clone()],
        [first_survey.key.clone(), second_survey.key.clone()],
    );
    let task_columns = [first_task.column.as_str(), second_task.column.as_str()];
    let progress_fields = [first_survey.progress_field(), second_survey.progress_field()];
    let marker = config.master.task_marker.as_str();

    let mut excluded = 0usize;
    for record in records {
        let task_coverage = coverage(record, &task_columns, |cell| task_done(cell, marker));
        let survey_coverage = coverage(record, &progress_fields, survey_done);
        match (task_coverage, survey_coverage) {
            (Some(tasks), Some(surveys)) => summary.increment(tasks, surveys),
            _ => excluded += 1,
        }
    }
    debug!(
        rows = records.len(),
        counted = summary.total(),
        excluded,
        "completion summary built"
    );
    Ok(summary)
}

fn coverage<S: AsRef<str>>(
    record: &Record,
    fields: &[S; 2],
    done: impl Fn(&CellValue) -> Option<bool>,
) -> Option<Coverage> {
    let first = done(record.get(fields[0].as_ref()))?;
    let second = done(record.get(fields[1].as_ref()))?;
    Some(match (first, second) {
        (true, false) => Coverage::FirstOnly,
        (false, true) => Coverage::SecondOnly,
        (true, true) => Coverage::Both,
        (false, false) => Coverage::Neither,
    })
}

fn task_done(cell: &CellValue, marker: &str) -> Option<bool> {
    match cell {
        CellValue::Missing => Some(false),
        CellValue::Text(value) if value == marker => Some(true),
        _ => None,
    }
}

fn survey_done(cell: &CellValue) -> Option<bool> {
    match cell {
        CellValue::Missing => Some(false),
        _ if cell.as_integer() == Some(COMPLETE_PROGRESS) => Some(true),
        _ => None,
    }
}
