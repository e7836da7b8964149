pub mod config;
pub mod error;
pub mod ids;
pub mod record;
pub mod redact;
pub mod summary;
pub mod warning;

pub use config::{
    MasterSettings, MergeScope, MergeSettings, OutputFormat, OutputSettings,
    QuestionnaireSettings, StudyConfig, SurveyConfig, TaskColumn,
};
pub use error::{ModelError, Result};
pub use ids::{ParticipantId, RowId};
pub use record::{CellValue, Record, RecordSet};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data};
pub use summary::{CompletionSummary, Coverage, PidFormatRow, PidFormatSummary};
pub use warning::MergeWarning;
