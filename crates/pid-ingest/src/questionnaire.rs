//! Questionnaire export loading.
//!
//! An export carries one survey-specific identifier column, three metadata
//! columns (progress, finished flag, duration) and any number of question
//! columns. Loading renames them into the merged-record namespace:
//!
//! | export column          | record field                 |
//! |------------------------|------------------------------|
//! | `Q5` (identifier)      | `ParticipantID`              |
//! | `Progress`             | `CNProgress`                 |
//! | `Finished`             | `CNFinished`                 |
//! | `Duration (in seconds)`| `CNDuration (in seconds)`    |
//! | `Q2`                   | `CN.Q2`                      |
//!
//! Administrative columns and columns with a blank header are dropped.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use pid_model::{
    CellValue, ParticipantId, QuestionnaireSettings, Record, RecordSet, RowId, SurveyConfig,
    redact_value,
};

use crate::csv_table::read_csv_table;
use crate::error::Result;
use crate::values::{parse_flag, parse_integer};

/// Records parsed from one questionnaire export file.
#[derive(Debug, Clone)]
pub struct QuestionnaireExport {
    pub survey_key: String,
    pub path: PathBuf,
    pub records: RecordSet,
    /// Export columns dropped on load, in header order.
    pub dropped_columns: Vec<String>,
}

#[derive(Debug, Clone)]
enum ColumnRole {
    Identifier,
    Progress,
    Finished,
    Duration,
    Response(String),
    Dropped,
}

impl ColumnRole {
    fn field_name(&self, survey: &SurveyConfig, settings: &QuestionnaireSettings) -> Option<String> {
        match self {
            Self::Identifier => Some(settings.id_field.clone()),
            Self::Progress => Some(survey.progress_field()),
            Self::Finished => Some(survey.finished_field()),
            Self::Duration => Some(survey.duration_field(settings)),
            Self::Response(field) => Some(field.clone()),
            Self::Dropped => None,
        }
    }
}

/// Canonical identifier cell: trimmed, uppercased, sentinels mapped to `Missing`.
pub fn identifier_cell(raw: &str, settings: &QuestionnaireSettings) -> CellValue {
    let canonical = ParticipantId::canonicalize(raw);
    if settings.is_missing_sentinel(&canonical) {
        CellValue::Missing
    } else {
        CellValue::Text(canonical)
    }
}

pub fn load_questionnaire(
    path: &Path,
    survey: &SurveyConfig,
    settings: &QuestionnaireSettings,
) -> Result<QuestionnaireExport> {
    let table = read_csv_table(path, settings.secondary_header_rows)?;
    let id_idx = table.require_column(&survey.id_column, path)?;
    let progress_idx = table.require_column(&settings.progress_column, path)?;
    let finished_idx = table.require_column(&settings.finished_column, path)?;
    let duration_idx = table.column_index(&settings.duration_column);

    let mut dropped_columns = Vec::new();
    let roles: Vec<ColumnRole> = table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let role = if idx == id_idx {
                ColumnRole::Identifier
            } else if idx == progress_idx {
                ColumnRole::Progress
            } else if idx == finished_idx {
                ColumnRole::Finished
            } else if Some(idx) == duration_idx {
                ColumnRole::Duration
            } else if header.is_empty() || settings.is_admin_column(header) {
                ColumnRole::Dropped
            } else {
                ColumnRole::Response(survey.response_field(header))
            };
            if matches!(role, ColumnRole::Dropped) {
                dropped_columns.push(header.clone());
            }
            role
        })
        .collect();

    let columns: Vec<String> = roles
        .iter()
        .filter_map(|role| role.field_name(survey, settings))
        .collect();
    let mut records = RecordSet::new(columns);

    for (row_idx, row) in table.rows.iter().enumerate() {
        let mut record = Record::new(RowId::new(row_idx));
        for (role, value) in roles.iter().zip(row) {
            let Some(field) = role.field_name(survey, settings) else {
                continue;
            };
            let cell = match role {
                ColumnRole::Identifier => identifier_cell(value, settings),
                ColumnRole::Progress | ColumnRole::Duration => match parse_integer(value) {
                    Ok(Some(parsed)) => CellValue::Integer(parsed),
                    Ok(None) => CellValue::Missing,
                    Err(raw) => {
                        warn!(
                            survey = %survey.key,
                            row = row_idx,
                            field = %field,
                            value = redact_value(&raw),
                            "non-numeric value kept as text"
                        );
                        CellValue::Text(raw)
                    }
                },
                ColumnRole::Finished => match parse_flag(value) {
                    Ok(Some(flag)) => CellValue::Boolean(flag),
                    Ok(None) => CellValue::Missing,
                    Err(raw) => {
                        warn!(
                            survey = %survey.key,
                            row = row_idx,
                            field = %field,
                            value = redact_value(&raw),
                            "unrecognised finished flag kept as text"
                        );
                        CellValue::Text(raw)
                    }
                },
                ColumnRole::Response(_) => CellValue::text(value),
                ColumnRole::Dropped => continue,
            };
            record.set(field, cell);
        }
        records.push(record);
    }

    debug!(
        survey = %survey.key,
        path = %path.display(),
        rows = records.len(),
        columns = records.columns.len(),
        dropped = dropped_columns.len(),
        "questionnaire loaded"
    );

    Ok(QuestionnaireExport {
        survey_key: survey.key.clone(),
        path: path.to_path_buf(),
        records,
        dropped_columns,
    })
}
