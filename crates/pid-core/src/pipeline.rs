//! Sequential reconciliation: data record, then each survey in turn.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, info_span};

use pid_ingest::{load_questionnaire, select_survey};
use pid_model::{
    CompletionSummary, MergeScope, MergeWarning, PidFormatSummary, RecordSet, StudyConfig,
    SurveyConfig,
};

use crate::error::{ReconcileError, Result};
use crate::merge::{MergeStats, merge};
use crate::partition::{PartitionStats, RecordPartition, partition};
use crate::reference::{ReferenceSet, load_reference};
use crate::summary::{summarize_completion, summarize_pid_format};

/// Input files for one run.
#[derive(Debug, Clone)]
pub struct ReconcileInputs {
    /// The data record.
    pub record: PathBuf,
    /// One export per configured survey, in any order.
    pub questionnaires: Vec<PathBuf>,
}

/// What happened to one survey's export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyOutcome {
    pub key: String,
    pub phase_label: String,
    pub path: PathBuf,
    pub partition: PartitionStats,
    pub merge: MergeStats,
    pub dropped_columns: Vec<String>,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The data record with every matched questionnaire field merged in.
    pub records: RecordSet,
    pub pid_format: PidFormatSummary,
    pub completion: CompletionSummary,
    /// Per-survey outcomes, in configuration order.
    pub surveys: Vec<SurveyOutcome>,
    pub warnings: Vec<MergeWarning>,
}

/// Pair each configured survey with exactly one export file.
///
/// Files are matched by name; the result follows configuration order.
pub fn assign_surveys<'a>(
    paths: &[PathBuf],
    config: &'a StudyConfig,
) -> Result<Vec<(&'a SurveyConfig, PathBuf)>> {
    let mut assigned: Vec<Vec<PathBuf>> = vec![Vec::new(); config.surveys.len()];
    for path in paths {
        let survey = select_survey(path, &config.surveys).ok_or_else(|| {
            ReconcileError::UnknownSurvey {
                path: path.clone(),
            }
        })?;
        let slot = config
            .surveys
            .iter()
            .position(|candidate| candidate.key == survey.key)
            .ok_or_else(|| ReconcileError::UnknownSurvey {
                path: path.clone(),
            })?;
        assigned[slot].push(path.clone());
    }

    config
        .surveys
        .iter()
        .zip(assigned)
        .map(|(survey, mut paths)| match paths.len() {
            0 => Err(ReconcileError::MissingSurvey {
                key: survey.key.clone(),
            }),
            1 => Ok((survey, paths.remove(0))),
            _ => Err(ReconcileError::DuplicateSurvey {
                key: survey.key.clone(),
                paths,
            }),
        })
        .collect()
}

/// Run the whole pipeline.
///
/// Surveys are merged strictly one after another in configuration order, so
/// a later survey only ever sees the data record as left by the earlier one.
pub fn reconcile(inputs: &ReconcileInputs, config: &StudyConfig) -> Result<Reconciliation> {
    config.validate()?;
    let run_start = Instant::now();
    let assignments = assign_surveys(&inputs.questionnaires, config)?;

    let mut reference = info_span!("ingest", source = "data record").in_scope(|| {
        load_reference(
            &inputs.record,
            &config.master,
            config.merge.reject_duplicate_ids,
        )
    })?;

    let mut partitions: Vec<RecordPartition> = Vec::with_capacity(assignments.len());
    let mut surveys = Vec::with_capacity(assignments.len());
    for (survey, path) in &assignments {
        let (partition, outcome) = reconcile_survey(&mut reference, survey, path, config)?;
        partitions.push(partition);
        surveys.push(outcome);
    }

    let span = info_span!("summarize");
    let _guard = span.enter();
    let pid_format = summarize_pid_format(
        assignments
            .iter()
            .map(|(survey, _)| survey.phase_label.as_str())
            .zip(&partitions),
    );
    let warnings = reference.warnings().to_vec();
    let records = reference.into_records();
    let completion = summarize_completion(&records, config)?;
    info!(
        rows = records.len(),
        columns = records.columns.len(),
        completion_counted = completion.total(),
        warnings = warnings.len(),
        duration_ms = run_start.elapsed().as_millis(),
        "reconciliation complete"
    );

    Ok(Reconciliation {
        records,
        pid_format,
        completion,
        surveys,
        warnings,
    })
}

fn reconcile_survey(
    reference: &mut ReferenceSet,
    survey: &SurveyConfig,
    path: &Path,
    config: &StudyConfig,
) -> Result<(RecordPartition, SurveyOutcome)> {
    let settings = &config.questionnaire;

    let export = info_span!("ingest", survey = %survey.key)
        .in_scope(|| load_questionnaire(path, survey, settings))?;
    let columns = export.records.columns.clone();

    let partition = info_span!("partition", survey = %survey.key).in_scope(|| {
        let start = Instant::now();
        let split = partition(export.records.records, &settings.id_field, settings)?;
        info!(
            rows = split.total(),
            valid = split.valid.len(),
            invalid = split.invalid.len(),
            duration_ms = start.elapsed().as_millis(),
            "identifiers partitioned"
        );
        Ok::<_, ReconcileError>(split)
    })?;

    let offered = match config.merge.scope {
        MergeScope::All => partition.iter_source_order().cloned().collect(),
        MergeScope::Valid => partition.valid.clone(),
    };
    let incoming = RecordSet {
        columns,
        records: offered,
    };
    let stats = info_span!("merge", survey = %survey.key)
        .in_scope(|| merge(reference, &incoming, &settings.id_field))?;

    let outcome = SurveyOutcome {
        key: survey.key.clone(),
        phase_label: survey.phase_label.clone(),
        path: path.to_path_buf(),
        partition: partition.stats(),
        merge: stats,
        dropped_columns: export.dropped_columns,
    };
    Ok((partition, outcome))
}
