//! Study configuration.
//!
//! Column names are a contract with the upstream export tooling, so every one
//! of them lives here rather than in code. `StudyConfig::default()` matches the
//! July 2023 questionnaire exports; a TOML file may override any section.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ModelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyConfig {
    pub master: MasterSettings,
    pub questionnaire: QuestionnaireSettings,
    pub surveys: Vec<SurveyConfig>,
    pub merge: MergeSettings,
    pub output: OutputSettings,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            master: MasterSettings::default(),
            questionnaire: QuestionnaireSettings::default(),
            surveys: vec![
                SurveyConfig {
                    key: "CN".to_string(),
                    phase_label: "During session".to_string(),
                    id_column: "Q5".to_string(),
                    field_prefix: "CN".to_string(),
                    file_pattern: None,
                    labels: None,
                },
                SurveyConfig {
                    key: "POST".to_string(),
                    phase_label: "After session".to_string(),
                    id_column: "Q1".to_string(),
                    field_prefix: "Post".to_string(),
                    file_pattern: Some("Post".to_string()),
                    labels: None,
                },
            ],
            merge: MergeSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl StudyConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.surveys.len() != 2 {
            return Err(ModelError::InvalidConfig(format!(
                "expected exactly 2 surveys, found {}",
                self.surveys.len()
            )));
        }
        if self.master.tasks.len() != 2 {
            return Err(ModelError::InvalidConfig(format!(
                "expected exactly 2 task columns, found {}",
                self.master.tasks.len()
            )));
        }
        require_non_empty("master.id_column", &self.master.id_column)?;
        require_non_empty("master.task_marker", &self.master.task_marker)?;
        for task in &self.master.tasks {
            require_non_empty("master.tasks.key", &task.key)?;
            require_non_empty("master.tasks.column", &task.column)?;
        }
        let settings = &self.questionnaire;
        require_non_empty("questionnaire.id_field", &settings.id_field)?;
        require_non_empty("questionnaire.progress_column", &settings.progress_column)?;
        require_non_empty("questionnaire.finished_column", &settings.finished_column)?;

        let mut keys = BTreeSet::new();
        let mut prefixes = BTreeSet::new();
        let mut fallbacks = 0usize;
        for survey in &self.surveys {
            require_non_empty("surveys.key", &survey.key)?;
            require_non_empty("surveys.id_column", &survey.id_column)?;
            require_non_empty("surveys.field_prefix", &survey.field_prefix)?;
            if !keys.insert(survey.key.to_uppercase()) {
                return Err(ModelError::InvalidConfig(format!(
                    "duplicate survey key '{}'",
                    survey.key
                )));
            }
            if !prefixes.insert(survey.field_prefix.clone()) {
                return Err(ModelError::InvalidConfig(format!(
                    "duplicate field prefix '{}'",
                    survey.field_prefix
                )));
            }
            match survey.file_pattern.as_deref() {
                None => fallbacks += 1,
                Some(pattern) if pattern.trim().is_empty() => {
                    return Err(ModelError::InvalidConfig(format!(
                        "survey '{}' has an empty file_pattern",
                        survey.key
                    )));
                }
                Some(_) => {}
            }
        }
        if fallbacks > 1 {
            return Err(ModelError::InvalidConfig(
                "at most one survey may omit file_pattern".to_string(),
            ));
        }
        if self.output.formats.is_empty() {
            return Err(ModelError::InvalidConfig(
                "output.formats must name at least one format".to_string(),
            ));
        }
        Ok(())
    }

    pub fn survey(&self, key: &str) -> Option<&SurveyConfig> {
        self.surveys
            .iter()
            .find(|survey| survey.key.eq_ignore_ascii_case(key))
    }
}

fn require_non_empty(name: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::InvalidConfig(format!("{name} must not be empty")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MasterSettings {
    /// Identifier column of the data record; becomes the merge key.
    pub id_column: String,
    /// Cell value marking a task as completed.
    pub task_marker: String,
    pub tasks: Vec<TaskColumn>,
}

impl Default for MasterSettings {
    fn default() -> Self {
        Self {
            id_column: "Participant ID".to_string(),
            task_marker: "Y".to_string(),
            tasks: vec![
                TaskColumn {
                    key: "RS".to_string(),
                    column: "RS".to_string(),
                },
                TaskColumn {
                    key: "Audio".to_string(),
                    column: "Audio".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskColumn {
    pub key: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestionnaireSettings {
    /// Rows between the header and the first response (question text rows).
    pub secondary_header_rows: usize,
    /// Field name the survey-specific identifier column is renamed to.
    pub id_field: String,
    pub progress_column: String,
    pub finished_column: String,
    pub duration_column: String,
    /// Identifier values treated as absent (compared after canonicalization).
    pub missing_sentinels: Vec<String>,
    /// Export bookkeeping columns dropped on load when present.
    pub admin_columns: Vec<String>,
}

impl Default for QuestionnaireSettings {
    fn default() -> Self {
        Self {
            secondary_header_rows: 1,
            id_field: "ParticipantID".to_string(),
            progress_column: "Progress".to_string(),
            finished_column: "Finished".to_string(),
            duration_column: "Duration (in seconds)".to_string(),
            missing_sentinels: vec![String::new(), "NAN".to_string(), "NA".to_string()],
            admin_columns: [
                "StartDate",
                "RecipientEmail",
                "RecipientFirstName",
                "RecipientLastName",
                "EndDate",
                "Status",
                "IPAddress",
                "ExternalReference",
                "LocationLatitude",
                "LocationLongitude",
                "DistributionChannel",
                "ResponseId",
                "RecordedDate",
                "UserLanguage",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl QuestionnaireSettings {
    pub fn is_missing_sentinel(&self, canonical: &str) -> bool {
        self.missing_sentinels
            .iter()
            .any(|sentinel| sentinel.trim().eq_ignore_ascii_case(canonical))
    }

    pub fn is_admin_column(&self, name: &str) -> bool {
        self.admin_columns.iter().any(|column| column == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyConfig {
    /// Short survey name, e.g. "CN".
    pub key: String,
    /// Row label in the identifier-format summary.
    pub phase_label: String,
    /// Column holding the participant identifier in this survey's export.
    pub id_column: String,
    /// Prefix namespacing this survey's fields in the merged record.
    pub field_prefix: String,
    /// Substring of the export file name selecting this survey. The survey
    /// without a pattern is the fallback.
    #[serde(default)]
    pub file_pattern: Option<String>,
    /// CSV (`code,label`) relabeling question codes in the merged output.
    #[serde(default)]
    pub labels: Option<PathBuf>,
}

impl SurveyConfig {
    pub fn progress_field(&self) -> String {
        format!("{}Progress", self.field_prefix)
    }

    pub fn finished_field(&self) -> String {
        format!("{}Finished", self.field_prefix)
    }

    pub fn duration_field(&self, settings: &QuestionnaireSettings) -> String {
        format!("{}{}", self.field_prefix, settings.duration_column)
    }

    pub fn response_field(&self, code: &str) -> String {
        format!("{}.{}", self.field_prefix, code)
    }

    /// Question code of a namespaced response field owned by this survey.
    pub fn response_code<'a>(&self, field: &'a str) -> Option<&'a str> {
        field
            .strip_prefix(self.field_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeScope {
    /// Offer every questionnaire record to the merge.
    #[default]
    All,
    /// Offer only records whose identifier passed validation.
    Valid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeSettings {
    pub scope: MergeScope,
    /// Fail instead of warning when the data record repeats an identifier.
    pub reject_duplicate_ids: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// CSV (`value,replacement`) applied to merged cell text before export.
    pub value_map: Option<PathBuf>,
    pub formats: Vec<OutputFormat>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            value_map: None,
            formats: vec![OutputFormat::Csv],
        }
    }
}
