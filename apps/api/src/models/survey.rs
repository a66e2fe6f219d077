use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::dimension::Dimension;

/// One entry of the static question reference file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: String,
    pub category: String,
    pub text: String,
}

/// A single respondent's answer to a single question, in long form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub client: String,
    pub question: String,
    pub category: Dimension,
    pub score: f64,
    pub timestamp: Option<NaiveDateTime>,
}

/// Column roles resolved once when a file is ingested.
///
/// Indices point into `RawTable::headers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurveyLayout {
    /// Wide export: one column per question.
    Raw {
        client: usize,
        timestamp: Option<usize>,
        question_columns: Vec<QuestionColumn>,
    },
    /// Long form with explicit category and score columns.
    Standardized {
        client: usize,
        category: usize,
        score: usize,
        question: Option<usize>,
        timestamp: Option<usize>,
    },
}

impl SurveyLayout {
    pub fn name(&self) -> &'static str {
        match self {
            SurveyLayout::Raw { .. } => "raw",
            SurveyLayout::Standardized { .. } => "standardized",
        }
    }
}

/// A wide-format column that will be melted into long rows.
///
/// `resolved` is `None` for question-like headers the reference map does not know.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionColumn {
    pub index: usize,
    pub header: String,
    pub resolved: Option<ResolvedQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedQuestion {
    pub id: String,
    pub category: Dimension,
}

/// Counters collected while normalizing one upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub rows_read: usize,
    pub records: usize,
    pub dropped_missing_score: usize,
    pub dropped_missing_client: usize,
    pub ignored_columns: Vec<String>,
}
