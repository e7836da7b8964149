//! The data record as a keyed merge target.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use pid_ingest::load_master_table;
use pid_model::{
    MasterSettings, MergeWarning, ParticipantId, Record, RecordSet, RowId, redact_value,
};

use crate::error::{ReconcileError, Result};

/// Data record rows plus an identifier index for constant-time matching.
///
/// The index maps each canonical identifier to the position of the first row
/// carrying it. Rows without an identifier stay in the set but can never be
/// merge targets.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    records: RecordSet,
    id_field: String,
    index: HashMap<ParticipantId, usize>,
    warnings: Vec<MergeWarning>,
}

impl ReferenceSet {
    /// Index `records` by `id_field`.
    ///
    /// A repeated identifier yields a [`MergeWarning::AmbiguousReferenceId`],
    /// or fails when `reject_duplicates` is set.
    pub fn from_records(
        records: RecordSet,
        id_field: impl Into<String>,
        reject_duplicates: bool,
    ) -> Result<Self> {
        let id_field = id_field.into();
        let mut index = HashMap::with_capacity(records.len());
        let mut repeats: Vec<(ParticipantId, Vec<RowId>)> = Vec::new();

        for (position, record) in records.iter().enumerate() {
            let Some(id) = record.participant_id(&id_field) else {
                continue;
            };
            match index.get(&id) {
                None => {
                    index.insert(id, position);
                }
                Some(&first) => {
                    let row = record.row;
                    if let Some((_, rows)) = repeats.iter_mut().find(|(seen, _)| *seen == id) {
                        rows.push(row);
                    } else {
                        repeats.push((id, vec![records.records[first].row, row]));
                    }
                }
            }
        }

        if reject_duplicates && let Some((id, rows)) = repeats.first() {
            return Err(ReconcileError::DuplicateReferenceId {
                id: id.clone(),
                rows: rows.clone(),
            });
        }

        let warnings: Vec<MergeWarning> = repeats
            .into_iter()
            .map(|(id, rows)| {
                warn!(
                    id = redact_value(id.as_str()),
                    occurrences = rows.len(),
                    "data record repeats an identifier; only the first row receives merges"
                );
                MergeWarning::AmbiguousReferenceId { id, rows }
            })
            .collect();

        Ok(Self {
            records,
            id_field,
            index,
            warnings,
        })
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.index.contains_key(id)
    }

    /// Distinct identifiers present in the data record.
    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.index.keys()
    }

    /// First row carrying `id`.
    pub fn find(&self, id: &ParticipantId) -> Option<&Record> {
        self.index
            .get(id)
            .map(|&position| &self.records.records[position])
    }

    pub(crate) fn find_mut(&mut self, id: &ParticipantId) -> Option<&mut Record> {
        let position = *self.index.get(id)?;
        self.records.records.get_mut(position)
    }

    pub(crate) fn records_mut(&mut self) -> &mut RecordSet {
        &mut self.records
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn into_records(self) -> RecordSet {
        self.records
    }

    pub fn warnings(&self) -> &[MergeWarning] {
        &self.warnings
    }
}

/// Load the data record from `path` and index it by its identifier column.
pub fn load_reference(
    path: &Path,
    settings: &MasterSettings,
    reject_duplicates: bool,
) -> Result<ReferenceSet> {
    let records = load_master_table(path, settings)?;
    let reference = ReferenceSet::from_records(records, &settings.id_column, reject_duplicates)?;
    info!(
        path = %path.display(),
        rows = reference.len(),
        ids = reference.index.len(),
        duplicates = reference.warnings.len(),
        "data record indexed"
    );
    Ok(reference)
}
