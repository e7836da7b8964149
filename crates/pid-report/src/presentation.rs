//! Presentation step applied to the merged data record before export.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use pid_ingest::{LookupTable, load_label_map, load_value_map};
use pid_model::{CellValue, RecordSet, StudyConfig, SurveyConfig};

/// Lookup tables named by the study configuration.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    /// Question-code labels per survey, keyed by survey key.
    pub labels: BTreeMap<String, LookupTable>,
    pub value_map: Option<LookupTable>,
}

impl Presentation {
    /// Load every label table and the value map the configuration names.
    pub fn load(config: &StudyConfig) -> Result<Self> {
        let mut labels = BTreeMap::new();
        for survey in &config.surveys {
            if let Some(path) = &survey.labels {
                let table = load_label_map(path).with_context(|| {
                    format!("load {} labels from {}", survey.key, path.display())
                })?;
                labels.insert(survey.key.clone(), table);
            }
        }
        let value_map = config
            .output
            .value_map
            .as_deref()
            .map(|path| {
                load_value_map(path)
                    .with_context(|| format!("load value map from {}", path.display()))
            })
            .transpose()?;
        Ok(Self { labels, value_map })
    }

    /// Relabel columns, then replace values. Returns (columns renamed, cells replaced).
    pub fn apply(&self, records: &mut RecordSet, surveys: &[SurveyConfig]) -> (usize, usize) {
        let tables: Vec<(&SurveyConfig, &LookupTable)> = surveys
            .iter()
            .filter_map(|survey| self.labels.get(&survey.key).map(|table| (survey, table)))
            .collect();
        let renamed = relabel_columns(records, &tables);
        let replaced = self
            .value_map
            .as_ref()
            .map_or(0, |map| replace_values(records, map));
        (renamed, replaced)
    }
}

/// Rename `{prefix}.{code}` columns to the label the owning survey's table
/// gives `code`.
///
/// Columns without a label keep their namespaced name. A label that would
/// duplicate an existing column name is skipped.
pub fn relabel_columns(
    records: &mut RecordSet,
    surveys: &[(&SurveyConfig, &LookupTable)],
) -> usize {
    let mut taken: BTreeSet<String> = records.columns.iter().cloned().collect();
    let mut renames: BTreeMap<String, String> = BTreeMap::new();

    for column in &records.columns {
        let label = surveys.iter().find_map(|(survey, table)| {
            survey
                .response_code(column)
                .and_then(|code| table.get(code))
        });
        let Some(label) = label else {
            continue;
        };
        if taken.contains(label) {
            warn!(
                column = %column,
                label,
                "label already used by another column; keeping field name"
            );
            continue;
        }
        taken.remove(column);
        taken.insert(label.to_string());
        renames.insert(column.clone(), label.to_string());
    }

    if renames.is_empty() {
        return 0;
    }
    for column in &mut records.columns {
        if let Some(label) = renames.get(column.as_str()) {
            *column = label.clone();
        }
    }
    for record in &mut records.records {
        let fields = std::mem::take(&mut record.fields);
        record.fields = fields
            .into_iter()
            .map(|(name, value)| match renames.get(&name) {
                Some(label) => (label.clone(), value),
                None => (name, value),
            })
            .collect();
    }
    debug!(renamed = renames.len(), "columns relabeled");
    renames.len()
}

/// Replace text cells equal to a key of `map` with its replacement.
pub fn replace_values(records: &mut RecordSet, map: &LookupTable) -> usize {
    let mut replaced = 0usize;
    for record in &mut records.records {
        for value in record.fields.values_mut() {
            let replacement = match value {
                CellValue::Text(text) => map.get(text),
                _ => None,
            };
            if let Some(replacement) = replacement {
                *value = CellValue::Text(replacement.to_string());
                replaced += 1;
            }
        }
    }
    debug!(replaced, "cell values replaced");
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use pid_model::{Record, RowId};

    fn merged() -> RecordSet {
        let mut records = RecordSet::new(vec![
            "Participant ID".to_string(),
            "CN.Q2".to_string(),
            "CN.Q9".to_string(),
            "Post.Q2".to_string(),
        ]);
        records.push(
            Record::new(RowId::new(0))
                .with_field("Participant ID", CellValue::text("AB1234"))
                .with_field("CN.Q2", CellValue::text("IM_7NzSARqhuHLQW1M"))
                .with_field("Post.Q2", CellValue::text("Yes")),
        );
        records
    }

    #[test]
    fn relabels_per_survey() {
        let config = StudyConfig::default();
        let cn_labels: LookupTable = [("Q2", "Hair type")].into_iter().collect();
        let post_labels: LookupTable = [("Q2", "Enjoyed session")].into_iter().collect();
        let mut records = merged();

        let renamed = relabel_columns(
            &mut records,
            &[(&config.surveys[0], &cn_labels), (&config.surveys[1], &post_labels)],
        );

        assert_eq!(renamed, 2);
        assert_eq!(
            records.columns,
            vec!["Participant ID", "Hair type", "CN.Q9", "Enjoyed session"]
        );
        assert_eq!(
            records.records[0].get("Enjoyed session").as_text(),
            Some("Yes")
        );
        assert!(records.records[0].get("Post.Q2").is_missing());
    }

    #[test]
    fn colliding_label_keeps_field_name() {
        let config = StudyConfig::default();
        let labels: LookupTable = [("Q2", "Participant ID")].into_iter().collect();
        let mut records = merged();

        let renamed = relabel_columns(&mut records, &[(&config.surveys[0], &labels)]);

        assert_eq!(renamed, 0);
        assert!(records.has_column("CN.Q2"));
    }

    #[test]
    fn replaces_exact_matches_only() {
        let map: LookupTable = [("IM_7NzSARqhuHLQW1M", "21_A")].into_iter().collect();
        let mut records = merged();

        assert_eq!(replace_values(&mut records, &map), 1);
        assert_eq!(records.records[0].get("CN.Q2").as_text(), Some("21_A"));
        assert_eq!(records.records[0].get("Post.Q2").as_text(), Some("Yes"));
    }
}
