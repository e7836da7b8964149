#![deny(unsafe_code)]

use std::collections::BTreeMap;

use crate::{ParticipantId, RowId};

/// A single cell of a participant record.
///
/// Serialized untagged so that `Missing` renders as `null` in JSON output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Missing,
}

impl CellValue {
    /// Build a text cell, mapping blank input to `Missing`.
    pub fn text(value: impl AsRef<str>) -> Self {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            Self::Missing
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Integer view; text cells holding an integer also qualify.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    /// Rendering used for tabular output. `None` means an empty cell.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Text(value) => Some(value.clone()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Boolean(true) => Some("True".to_string()),
            Self::Boolean(false) => Some("False".to_string()),
            Self::Missing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub row: RowId,
    pub fields: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(row: RowId) -> Self {
        Self {
            row,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: CellValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Absent fields read as `Missing`.
    pub fn get(&self, name: &str) -> &CellValue {
        static MISSING: CellValue = CellValue::Missing;
        self.fields.get(name).unwrap_or(&MISSING)
    }

    pub fn set(&mut self, name: impl Into<String>, value: CellValue) -> Option<CellValue> {
        self.fields.insert(name.into(), value)
    }

    /// Canonical identifier held in `field`, if the cell carries text.
    pub fn participant_id(&self, field: &str) -> Option<ParticipantId> {
        self.get(field)
            .as_text()
            .and_then(|value| ParticipantId::new(value).ok())
    }
}

/// An ordered collection of records sharing a column list.
///
/// `columns` keeps first-seen order so output tables stay stable; records may
/// omit any column, which reads as `Missing`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Append `name` to the column list unless already present.
    pub fn ensure_column(&mut self, name: &str) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.columns.push(name.to_string());
        true
    }

    pub fn get(&self, row: RowId) -> Option<&Record> {
        self.records.iter().find(|record| record.row == row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
