use std::path::PathBuf;

use pid_core::{PidCheck, Reconciliation};
use pid_model::OutputFormat;

/// Inputs and overrides for one `run` invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub record: PathBuf,
    pub questionnaires: Vec<PathBuf>,
    /// Directory whose `.csv` files are added to `questionnaires`.
    pub questionnaire_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    /// Defaults to `output/` next to the data record.
    pub output_dir: Option<PathBuf>,
    /// Replaces the configured formats when set.
    pub formats: Option<Vec<OutputFormat>>,
    pub dry_run: bool,
    pub merge_valid_only: bool,
    pub reject_duplicate_ids: bool,
}

#[derive(Debug)]
pub struct RunResult {
    pub record: PathBuf,
    pub output_dir: PathBuf,
    /// Files written, empty for a dry run.
    pub outputs: Vec<PathBuf>,
    pub dry_run: bool,
    pub reconciliation: Reconciliation,
    pub renamed_columns: usize,
    pub replaced_values: usize,
}

/// One row of `check` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidCheckRow {
    pub input: String,
    pub canonical: String,
    pub check: PidCheck,
}
