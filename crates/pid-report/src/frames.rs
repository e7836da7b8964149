//! Tabular views of the report tables as polars frames.

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame};

use pid_model::{CompletionSummary, Coverage, PidFormatSummary, RecordSet};

/// Rendering of an undefined incorrect-identifier percentage.
pub const NOT_APPLICABLE: &str = "N/A";

const PHASE_COLUMN: &str = "Phase";
const TASKS_COLUMN: &str = "Tasks";

/// The merged data record, one string column per field in column order.
pub fn records_frame(records: &RecordSet) -> Result<DataFrame> {
    let columns: Vec<Column> = records
        .columns
        .iter()
        .map(|name| {
            let values: Vec<Option<String>> = records
                .iter()
                .map(|record| record.get(name).render())
                .collect();
            Column::new(name.as_str().into(), values)
        })
        .collect();
    DataFrame::new(columns).context("build data record frame")
}

pub fn format_percent(percent: Option<f64>) -> String {
    match percent {
        Some(value) => format!("{value:.2}"),
        None => NOT_APPLICABLE.to_string(),
    }
}

pub fn pid_format_frame(summary: &PidFormatSummary) -> Result<DataFrame> {
    let phases: Vec<&str> = summary.rows.iter().map(|row| row.phase.as_str()).collect();
    let correct: Vec<u32> = summary.rows.iter().map(|row| count(row.correct)).collect();
    let incorrect: Vec<u32> = summary.rows.iter().map(|row| count(row.incorrect)).collect();
    let percent: Vec<String> = summary
        .rows
        .iter()
        .map(|row| format_percent(row.incorrect_percent))
        .collect();
    DataFrame::new(vec![
        Column::new(PHASE_COLUMN.into(), phases),
        Column::new("Number of Correctly Entered PIDs".into(), correct),
        Column::new("Number of Incorrectly Entered PIDs".into(), incorrect),
        Column::new("%".into(), percent),
    ])
    .context("build identifier format frame")
}

pub fn completion_frame(summary: &CompletionSummary) -> Result<DataFrame> {
    let row_labels = summary.row_labels();
    let mut columns = vec![Column::new(TASKS_COLUMN.into(), row_labels.to_vec())];
    for (surveys, label) in Coverage::ALL.into_iter().zip(summary.column_labels()) {
        let counts: Vec<u32> = Coverage::ALL
            .into_iter()
            .map(|tasks| count(summary.get(tasks, surveys)))
            .collect();
        columns.push(Column::new(label.into(), counts));
    }
    DataFrame::new(columns).context("build completion frame")
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
