// Survey Normalizer
// Implements: upload decoding, text normalization, question map lookup,
// raw/standardized layout detection, wide-to-long reshape, client scoping.

pub mod handlers;
pub mod normalize;
pub mod question_map;
pub mod reader;
pub mod text;

use thiserror::Error;

pub use normalize::{normalize_survey, NormalizedSurvey};
pub use question_map::QuestionMap;
pub use reader::read_table;

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("Unsupported survey file '{0}': expected .csv or a spreadsheet (.xlsx, .xls, .ods)")]
    UnsupportedFormat(String),

    #[error("Survey file has no header row")]
    Empty,

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Mapping error: {message}: {}", unresolved.join(", "))]
    Mapping {
        message: String,
        unresolved: Vec<String>,
    },

    #[error("Client '{0}' not found in survey")]
    ClientNotFound(String),

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(String),
}
