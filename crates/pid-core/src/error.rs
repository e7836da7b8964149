//! Error types for the reconciliation pipeline.

use std::path::PathBuf;

use pid_ingest::IngestError;
use pid_model::{ModelError, ParticipantId, RowId};
use thiserror::Error;

/// Errors that abort a reconciliation run.
///
/// Identifier validation failures are not errors; they are reported as
/// [`crate::PidCheck`] values on the partition.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Config(#[from] ModelError),

    /// A record count changed across a stage that must preserve it.
    #[error("integrity check failed after {stage}: expected {expected} records, found {actual}")]
    Integrity {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The data record repeats an identifier and duplicates are rejected.
    #[error("identifier {id} appears more than once in the data record (rows {})", join_rows(.rows))]
    DuplicateReferenceId { id: ParticipantId, rows: Vec<RowId> },

    #[error("no survey matches questionnaire file {path}")]
    UnknownSurvey { path: PathBuf },

    #[error("no questionnaire file supplied for survey '{key}'")]
    MissingSurvey { key: String },

    #[error("survey '{key}' matched more than one questionnaire file: {}", join_paths(.paths))]
    DuplicateSurvey { key: String, paths: Vec<PathBuf> },
}

impl ReconcileError {
    /// True for failures caused by input files not matching the expected columns.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Ingest(error) if error.is_schema_error())
    }
}

fn join_rows(rows: &[RowId]) -> String {
    rows.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_message_names_stage() {
        let error = ReconcileError::Integrity {
            stage: "merge",
            expected: 4,
            actual: 5,
        };
        assert_eq!(
            error.to_string(),
            "integrity check failed after merge: expected 4 records, found 5"
        );
    }

    #[test]
    fn duplicate_reference_lists_rows() {
        let error = ReconcileError::DuplicateReferenceId {
            id: ParticipantId::new("AB1234").expect("id"),
            rows: vec![RowId::new(0), RowId::new(3)],
        };
        assert_eq!(
            error.to_string(),
            "identifier AB1234 appears more than once in the data record (rows 0, 3)"
        );
    }

    #[test]
    fn schema_errors_are_recognised_through_ingest() {
        let error = ReconcileError::from(IngestError::MissingColumn {
            column: "Q5".to_string(),
            path: PathBuf::from("cn.csv"),
        });
        assert!(error.is_schema_error());
        assert!(!ReconcileError::MissingSurvey { key: "CN".into() }.is_schema_error());
    }
}
