use std::collections::BTreeSet;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// Raw delimited-text table: one header row and string cells.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Index of `name`, or the schema error naming the file and column.
    pub fn require_column(&self, name: &str, path: &Path) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| IngestError::missing_column(name, path))
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file whose first record is the header.
///
/// `skip_after_header` records directly below the header are discarded
/// (survey exports carry question text and import metadata there). Fully
/// blank records are ignored and short records are padded to header width.
pub fn read_csv_table(path: &Path, skip_after_header: usize) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|error| IngestError::csv(path, error))?;

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => {
            let record = record.map_err(|error| IngestError::csv(path, error))?;
            record.iter().map(normalize_header).collect()
        }
        None => {
            return Err(IngestError::EmptyCsv {
                path: path.to_path_buf(),
            });
        }
    };
    check_duplicate_headers(&headers, path)?;

    let mut skipped = 0usize;
    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|error| IngestError::csv(path, error))?;
        if skipped < skip_after_header {
            skipped += 1;
            continue;
        }
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(record.get(idx).map(normalize_cell).unwrap_or_default());
        }
        rows.push(row);
    }
    Ok(CsvTable { headers, rows })
}

fn check_duplicate_headers(headers: &[String], path: &Path) -> Result<()> {
    let mut seen = BTreeSet::new();
    for header in headers {
        if header.is_empty() {
            continue;
        }
        if !seen.insert(header.as_str()) {
            return Err(IngestError::DuplicateColumn {
                column: header.clone(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}
