use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use pid_core::{ReconcileInputs, classify_pid, reconcile};
use pid_ingest::{list_csv_files, load_study_config};
use pid_model::{MergeScope, ParticipantId, StudyConfig};
use pid_report::{Presentation, write_outputs};

use crate::types::{PidCheckRow, RunOptions, RunResult};

/// Reconcile the questionnaires against the data record and write the report.
pub fn run_reconcile(options: &RunOptions) -> Result<RunResult> {
    let span = info_span!("run", record = %options.record.display());
    let _guard = span.enter();
    let start = Instant::now();

    let config = resolve_config(options)?;
    let output_dir = options.output_dir.clone().unwrap_or_else(|| {
        options
            .record
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("output")
    });

    let mut questionnaires = options.questionnaires.clone();
    if let Some(dir) = &options.questionnaire_dir {
        let found = list_csv_files(dir)
            .with_context(|| format!("list questionnaires in {}", dir.display()))?;
        questionnaires.extend(found);
    }
    let inputs = ReconcileInputs {
        record: options.record.clone(),
        questionnaires,
    };

    let mut reconciliation = reconcile(&inputs, &config).context("reconcile questionnaires")?;

    let presentation = Presentation::load(&config)?;
    let (renamed_columns, replaced_values) =
        presentation.apply(&mut reconciliation.records, &config.surveys);

    let outputs = if options.dry_run {
        info!("dry run, no files written");
        Vec::new()
    } else {
        write_outputs(&output_dir, &reconciliation, &config.output.formats)
            .with_context(|| format!("write outputs to {}", output_dir.display()))?
    };

    info!(
        records = reconciliation.records.len(),
        renamed_columns,
        replaced_values,
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(RunResult {
        record: options.record.clone(),
        output_dir,
        outputs,
        dry_run: options.dry_run,
        reconciliation,
        renamed_columns,
        replaced_values,
    })
}

/// Load the configuration file (or the defaults) and apply flag overrides.
pub fn resolve_config(options: &RunOptions) -> Result<StudyConfig> {
    let mut config = match &options.config {
        Some(path) => load_study_config(path)
            .with_context(|| format!("load configuration {}", path.display()))?,
        None => StudyConfig::default(),
    };
    if options.merge_valid_only {
        config.merge.scope = MergeScope::Valid;
    }
    if options.reject_duplicate_ids {
        config.merge.reject_duplicate_ids = true;
    }
    if let Some(formats) = &options.formats {
        config.output.formats.clone_from(formats);
    }
    Ok(config)
}

pub fn run_check(pids: &[String]) -> Vec<PidCheckRow> {
    pids.iter()
        .map(|raw| PidCheckRow {
            input: raw.clone(),
            canonical: ParticipantId::canonicalize(raw),
            check: classify_pid(raw),
        })
        .collect()
}

pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&StudyConfig::default()).context("serialize default configuration")
}
