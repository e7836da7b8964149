//! Lossless split of questionnaire records by identifier validity.

use std::collections::BTreeMap;

use tracing::trace;

use pid_ingest::identifier_cell;
use pid_model::{CellValue, QuestionnaireSettings, Record};

use crate::error::{ReconcileError, Result};
use crate::validator::{PidCheck, classify_pid};

/// Per-reason record counts of one partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionStats {
    pub total: usize,
    pub valid: usize,
    pub missing: usize,
    pub wrong_length: usize,
    pub non_alphanumeric: usize,
}

impl PartitionStats {
    pub fn invalid(&self) -> usize {
        self.missing + self.wrong_length + self.non_alphanumeric
    }
}

/// Records of one questionnaire export, split by identifier validity.
///
/// Every source record sits in exactly one of `valid` and `invalid`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPartition {
    pub valid: Vec<Record>,
    pub invalid: Vec<Record>,
    reasons: BTreeMap<PidCheck, usize>,
}

impl RecordPartition {
    fn push(&mut self, record: Record, check: PidCheck) {
        *self.reasons.entry(check).or_default() += 1;
        if check.is_valid() {
            self.valid.push(record);
        } else {
            self.invalid.push(record);
        }
    }

    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    /// Number of records classified as `check`.
    pub fn count(&self, check: PidCheck) -> usize {
        self.reasons.get(&check).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> PartitionStats {
        PartitionStats {
            total: self.total(),
            valid: self.count(PidCheck::Valid),
            missing: self.count(PidCheck::Missing),
            wrong_length: self.count(PidCheck::WrongLength),
            non_alphanumeric: self.count(PidCheck::NonAlphanumeric),
        }
    }

    /// All records back in source row order.
    pub fn into_source_order(self) -> Vec<Record> {
        let mut records = self.valid;
        records.extend(self.invalid);
        records.sort_by_key(|record| record.row);
        records
    }

    pub fn iter_source_order(&self) -> impl Iterator<Item = &Record> {
        let mut records: Vec<&Record> = self.valid.iter().chain(&self.invalid).collect();
        records.sort_by_key(|record| record.row);
        records.into_iter()
    }
}

/// Canonicalize each record's identifier in place and route it to the valid
/// or invalid side.
///
/// Missing identifiers (blank or a configured placeholder) go to `invalid`.
pub fn partition(
    records: Vec<Record>,
    id_field: &str,
    settings: &QuestionnaireSettings,
) -> Result<RecordPartition> {
    let expected = records.len();
    let mut partition = RecordPartition::default();

    for mut record in records {
        let check = match record.get(id_field).render() {
            Some(raw) => {
                let cell = identifier_cell(&raw, settings);
                let check = cell.as_text().map_or(PidCheck::Missing, classify_pid);
                record.set(id_field, cell);
                check
            }
            None => {
                record.set(id_field, CellValue::Missing);
                PidCheck::Missing
            }
        };
        trace!(row = %record.row, check = check.label(), "identifier classified");
        partition.push(record, check);
    }

    let actual = partition.total();
    if actual != expected {
        return Err(ReconcileError::Integrity {
            stage: "partition",
            expected,
            actual,
        });
    }
    Ok(partition)
}
