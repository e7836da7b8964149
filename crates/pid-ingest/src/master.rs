use std::path::Path;

use tracing::debug;

use pid_model::{CellValue, MasterSettings, ParticipantId, Record, RecordSet, RowId};

use crate::csv_table::read_csv_table;
use crate::error::Result;

/// Read the data record. The identifier column is canonicalized on load;
/// every other column is kept verbatim under its header name.
pub fn load_master_table(path: &Path, settings: &MasterSettings) -> Result<RecordSet> {
    let table = read_csv_table(path, 0)?;
    let id_idx = table.require_column(&settings.id_column, path)?;

    let columns: Vec<String> = table
        .headers
        .iter()
        .filter(|header| !header.is_empty())
        .cloned()
        .collect();
    let mut records = RecordSet::new(columns);

    for (row_idx, row) in table.rows.iter().enumerate() {
        let mut record = Record::new(RowId::new(row_idx));
        for (col_idx, (header, value)) in table.headers.iter().zip(row).enumerate() {
            if header.is_empty() {
                continue;
            }
            let cell = if col_idx == id_idx {
                CellValue::text(ParticipantId::canonicalize(value))
            } else {
                CellValue::text(value)
            };
            record.set(header.clone(), cell);
        }
        records.push(record);
    }

    debug!(
        path = %path.display(),
        rows = records.len(),
        columns = records.columns.len(),
        "data record loaded"
    );
    Ok(records)
}
