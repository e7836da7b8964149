use std::path::Path;

use pid_model::StudyConfig;

use crate::error::{IngestError, Result};

/// Load and validate a study configuration file.
///
/// Relative lookup-table paths are resolved against the directory holding
/// the configuration file.
pub fn load_study_config(path: &Path) -> Result<StudyConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: StudyConfig =
        toml::from_str(&contents).map_err(|error| IngestError::ConfigParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    config
        .validate()
        .map_err(|error| IngestError::InvalidConfig {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    if let Some(base) = path.parent() {
        for survey in &mut config.surveys {
            if let Some(labels) = survey.labels.as_mut()
                && labels.is_relative()
            {
                *labels = base.join(&*labels);
            }
        }
        if let Some(value_map) = config.output.value_map.as_mut()
            && value_map.is_relative()
        {
            *value_map = base.join(&*value_map);
        }
    }
    Ok(config)
}
