//! CLI argument definitions for participant completion reconciliation.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use pid_cli::types::RunOptions;
use pid_model::OutputFormat;

#[derive(Parser)]
#[command(
    name = "participant-completion",
    version,
    about = "Reconcile questionnaire exports against the study data record",
    long_about = "Reconcile questionnaire exports against the study data record.\n\n\
                  Validates participant identifiers, merges matched responses into the\n\
                  data record and reports identifier quality and completion coverage."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log participant identifiers and response values instead of redacting them.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge questionnaire exports into the data record and write the report.
    Run(RunArgs),

    /// Check participant identifiers against the format rules.
    Check(CheckArgs),

    /// Print the default study configuration as TOML.
    DefaultConfig,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Data record CSV (one row per enrolled participant).
    #[arg(long = "record", value_name = "CSV")]
    pub record: PathBuf,

    /// Questionnaire export CSV; repeat or list one per survey.
    #[arg(
        long = "questionnaire",
        value_name = "CSV",
        num_args = 1..,
        required_unless_present = "questionnaire_dir",
        conflicts_with = "questionnaire_dir"
    )]
    pub questionnaires: Vec<PathBuf>,

    /// Directory holding the questionnaire exports.
    #[arg(long = "questionnaire-dir", value_name = "DIR")]
    pub questionnaire_dir: Option<PathBuf>,

    /// Study configuration TOML (default: built-in configuration).
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Output directory (default: <RECORD_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format (default: from configuration).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Reconcile and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Merge only records whose identifier passed validation.
    #[arg(long = "merge-valid-only")]
    pub merge_valid_only: bool,

    /// Fail when the data record repeats a participant identifier.
    #[arg(long = "reject-duplicate-ids")]
    pub reject_duplicate_ids: bool,
}

impl RunArgs {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            record: self.record.clone(),
            questionnaires: self.questionnaires.clone(),
            questionnaire_dir: self.questionnaire_dir.clone(),
            config: self.config.clone(),
            output_dir: self.output_dir.clone(),
            formats: self.format.map(OutputFormatArg::formats),
            dry_run: self.dry_run,
            merge_valid_only: self.merge_valid_only,
            reject_duplicate_ids: self.reject_duplicate_ids,
        }
    }
}

#[derive(Parser)]
pub struct CheckArgs {
    #[arg(value_name = "PID", required = true, allow_hyphen_values = true)]
    pub pids: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
    Both,
}

impl OutputFormatArg {
    fn formats(self) -> Vec<OutputFormat> {
        match self {
            Self::Csv => vec![OutputFormat::Csv],
            Self::Json => vec![OutputFormat::Json],
            Self::Both => vec![OutputFormat::Csv, OutputFormat::Json],
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
