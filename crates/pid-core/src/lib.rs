pub mod error;
pub mod merge;
pub mod partition;
pub mod pipeline;
pub mod reference;
pub mod summary;
pub mod validator;

pub use error::{ReconcileError, Result};
pub use merge::{MergeStats, merge};
pub use partition::{PartitionStats, RecordPartition, partition};
pub use pipeline::{ReconcileInputs, Reconciliation, SurveyOutcome, assign_surveys, reconcile};
pub use reference::{ReferenceSet, load_reference};
pub use summary::{COMPLETE_PROGRESS, summarize_completion, summarize_pid_format};
pub use validator::{PID_LENGTHS, PidCheck, classify_pid, is_valid};
