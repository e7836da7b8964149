use std::fmt;

use serde::Serialize;

use crate::{ParticipantId, RowId};

/// Non-fatal conditions surfaced to the caller alongside a merge result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeWarning {
    /// The data record repeats an identifier; merges only reach `rows[0]`.
    AmbiguousReferenceId { id: ParticipantId, rows: Vec<RowId> },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousReferenceId { id, rows } => {
                let rows: Vec<String> = rows.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "identifier {id} appears in data record rows {}; only the first is merged",
                    rows.join(", ")
                )
            }
        }
    }
}
