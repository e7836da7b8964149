pub mod config;
pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod lookup;
pub mod master;
pub mod questionnaire;
pub mod values;

pub use config::load_study_config;
pub use csv_table::{CsvTable, read_csv_table};
pub use discovery::{list_csv_files, select_survey};
pub use error::{IngestError, Result};
pub use lookup::{LookupTable, load_label_map, load_value_map};
pub use master::load_master_table;
pub use questionnaire::{QuestionnaireExport, identifier_cell, load_questionnaire};
pub use values::{parse_flag, parse_integer};
