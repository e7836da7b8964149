//! Folding questionnaire records into the data record.

use std::collections::HashSet;

use tracing::{debug, info};

use pid_model::{ParticipantId, RecordSet, redact_value};

use crate::error::{ReconcileError, Result};
use crate::reference::ReferenceSet;

/// Counts from one merge call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records offered to the merge.
    pub incoming: usize,
    /// Records whose identifier matched a data record row.
    pub matched: usize,
    /// Records dropped because no data record row carries their identifier.
    pub unmatched: usize,
    /// Records repeating an identifier seen earlier in the same source.
    pub repeated: usize,
}

/// Merge `incoming` into `reference`, matching on `id_field`.
///
/// A matching record's fields are written onto the first data record row
/// with the same identifier, replacing any value already stored under the
/// same field name. Records without a match are dropped; the data record
/// never gains rows. Calling this once per survey accumulates both surveys'
/// fields on the same rows.
pub fn merge(
    reference: &mut ReferenceSet,
    incoming: &RecordSet,
    id_field: &str,
) -> Result<MergeStats> {
    let before = reference.len();
    let mut stats = MergeStats {
        incoming: incoming.len(),
        ..MergeStats::default()
    };
    let mut seen: HashSet<ParticipantId> = HashSet::with_capacity(incoming.len());

    for record in incoming {
        let Some(id) = record.participant_id(id_field) else {
            stats.unmatched += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            stats.repeated += 1;
        }
        let Some(target) = reference.find_mut(&id) else {
            debug!(
                id = redact_value(id.as_str()),
                row = %record.row,
                "no data record row for identifier"
            );
            stats.unmatched += 1;
            continue;
        };
        for (field, value) in &record.fields {
            target.set(field.clone(), value.clone());
        }
        stats.matched += 1;
    }

    if stats.matched > 0 {
        let columns = reference.records_mut();
        for column in &incoming.columns {
            columns.ensure_column(column);
        }
    }

    let after = reference.len();
    if after != before {
        return Err(ReconcileError::Integrity {
            stage: "merge",
            expected: before,
            actual: after,
        });
    }

    info!(
        incoming = stats.incoming,
        matched = stats.matched,
        unmatched = stats.unmatched,
        repeated = stats.repeated,
        "merge complete"
    );
    Ok(stats)
}
