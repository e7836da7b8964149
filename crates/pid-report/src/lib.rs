//! Report output for participant completion runs.
//!
//! - **Presentation**: question-code relabeling and cell value replacement
//! - **Frames**: polars views of the merged record and both summaries
//! - **Writer**: CSV sheets and a JSON document, emitted atomically

pub mod frames;
pub mod presentation;
pub mod writer;

pub use frames::{
    NOT_APPLICABLE, completion_frame, format_percent, pid_format_frame, records_frame,
};
pub use presentation::{Presentation, relabel_columns, replace_values};
pub use writer::{
    COMPLETION_FILE, DATA_RECORD_FILE, JSON_REPORT_FILE, PID_FORMAT_FILE, write_outputs,
};
