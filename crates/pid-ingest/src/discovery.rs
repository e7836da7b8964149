//! File discovery and survey matching.

use std::path::{Path, PathBuf};

use tracing::debug;

use pid_model::SurveyConfig;

use crate::error::{IngestError, Result};

/// Questionnaire exports in `dir`: regular files with a `.csv` extension
/// (any case), sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let read_error = |source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut exports = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            exports.push(path);
        }
    }
    exports.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(dir = %dir.display(), files = exports.len(), "questionnaire exports listed");
    Ok(exports)
}

/// Picks the survey an export file belongs to.
///
/// The first survey whose `file_pattern` occurs in the file name wins; a
/// file matching no pattern falls back to the survey without one.
pub fn select_survey<'a>(path: &Path, surveys: &'a [SurveyConfig]) -> Option<&'a SurveyConfig> {
    let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");
    surveys
        .iter()
        .find(|survey| {
            survey
                .file_pattern
                .as_deref()
                .is_some_and(|pattern| file_name.contains(pattern))
        })
        .or_else(|| surveys.iter().find(|survey| survey.file_pattern.is_none()))
}
