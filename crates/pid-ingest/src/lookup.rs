//! Two-column lookup tables: question-code labels and cell value replacements.

use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    entries: BTreeMap<String, String>,
}

impl LookupTable {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelRow {
    code: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct ReplacementRow {
    value: String,
    replacement: String,
}

/// Load a `code,label` CSV mapping question codes to readable labels.
pub fn load_label_map(path: &Path) -> Result<LookupTable> {
    read_rows::<LabelRow>(path)
        .map(|rows| rows.into_iter().map(|row| (row.code, row.label)).collect())
}

/// Load a `value,replacement` CSV applied to merged cell text.
pub fn load_value_map(path: &Path) -> Result<LookupTable> {
    read_rows::<ReplacementRow>(path).map(|rows| {
        rows.into_iter()
            .map(|row| (row.value, row.replacement))
            .collect()
    })
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|error| IngestError::csv(path, error))?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<T>() {
        rows.push(row.map_err(|error| IngestError::csv(path, error))?);
    }
    Ok(rows)
}
