//! Layout detection, wide-to-long reshape and coverage checks.
//!
//! Flow: `detect_layout` resolves a `SurveyLayout` once from the header row, then
//! `normalize_survey` walks the rows according to that layout. Nothing downstream
//! re-inspects column names.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::models::{
    Dimension, NormalizationReport, QuestionColumn, SurveyLayout, SurveyRecord,
};
use crate::survey::question_map::QuestionMap;
use crate::survey::reader::{Cell, RawTable};
use crate::survey::text::{match_key, normalize_text, question_id_prefix};
use crate::survey::SurveyError;

const CLIENT_ALIASES: &[&str] = &[
    "client",
    "client name",
    "company",
    "organisation",
    "organization",
];
const TIMESTAMP_ALIASES: &[&str] = &[
    "timestamp",
    "submitted at",
    "submission time",
    "start time",
    "completion time",
    "date",
];
const QUESTION_ALIASES: &[&str] = &["question", "question text", "item"];
const CATEGORY_ALIASES: &[&str] = &["category", "dimension"];
const SCORE_ALIASES: &[&str] = &["score", "rating", "value"];

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Output of one normalization pass over an upload.
#[derive(Debug, Clone)]
pub struct NormalizedSurvey {
    pub layout: SurveyLayout,
    pub records: Vec<SurveyRecord>,
    pub report: NormalizationReport,
}

impl NormalizedSurvey {
    /// Sorted, de-duplicated client names present in the records.
    pub fn clients(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.client.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records for one client. The name is matched after text normalization.
    pub fn records_for_client(&self, client: &str) -> Result<Vec<SurveyRecord>, SurveyError> {
        let wanted = normalize_text(client);
        let records: Vec<SurveyRecord> = self
            .records
            .iter()
            .filter(|r| r.client == wanted)
            .cloned()
            .collect();
        if records.is_empty() {
            return Err(SurveyError::ClientNotFound(wanted));
        }
        Ok(records)
    }
}

/// Detects the layout and reshapes the table into long-form records.
pub fn normalize_survey(
    table: &RawTable,
    map: &QuestionMap,
) -> Result<NormalizedSurvey, SurveyError> {
    let layout = detect_layout(table, map)?;
    let (records, report) = match &layout {
        SurveyLayout::Raw {
            client,
            timestamp,
            question_columns,
        } => melt_raw(table, *client, *timestamp, question_columns)?,
        SurveyLayout::Standardized {
            client,
            category,
            score,
            question,
            timestamp,
        } => read_standardized(table, map, *client, *category, *score, *question, *timestamp)?,
    };

    let mut report = report;
    report.ignored_columns = ignored_columns(table, &layout);
    if !report.ignored_columns.is_empty() {
        debug!("Ignored survey columns: {:?}", report.ignored_columns);
    }
    if report.dropped_missing_score > 0 {
        warn!(
            "Dropped {} answers with a missing or non-numeric score",
            report.dropped_missing_score
        );
    }
    info!(
        "Normalized {} survey: rows={}, records={}",
        layout.name(),
        report.rows_read,
        report.records
    );

    Ok(NormalizedSurvey {
        layout,
        records,
        report,
    })
}

/// Resolves column roles from the header row.
pub fn detect_layout(table: &RawTable, map: &QuestionMap) -> Result<SurveyLayout, SurveyError> {
    let keys: Vec<String> = table.headers.iter().map(|h| match_key(h)).collect();

    let client = find_column(&keys, CLIENT_ALIASES);
    let timestamp = find_column(&keys, TIMESTAMP_ALIASES);
    let question = find_column(&keys, QUESTION_ALIASES);
    let category = find_column(&keys, CATEGORY_ALIASES);
    let score = find_column(&keys, SCORE_ALIASES);

    // A long-form export with category and score columns stays standardized even
    // when it carries a timestamp but no question column.
    let question_like = table
        .headers
        .iter()
        .any(|h| question_id_prefix(&normalize_text(h)).is_some() || map.resolve(h).is_some());
    let long_form = category.is_some() && score.is_some();
    let is_raw = question_like || (timestamp.is_some() && question.is_none() && !long_form);

    let client = client.ok_or_else(|| {
        SurveyError::Schema(format!(
            "missing client column (expected one of: {})",
            CLIENT_ALIASES.join(", ")
        ))
    })?;

    if is_raw {
        let question_columns = resolve_question_columns(table, map, client, timestamp);
        if question_columns.iter().all(|c| c.resolved.is_none()) {
            let mut candidates: Vec<String> = question_columns.iter().map(|c| c.header.clone()).collect();
            if candidates.is_empty() {
                candidates = table
                    .headers
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != client && Some(*i) != timestamp)
                    .map(|(_, h)| normalize_text(h))
                    .filter(|h| !h.is_empty())
                    .collect();
            }
            return Err(SurveyError::Mapping {
                message: "no survey columns match the reference question map".to_string(),
                unresolved: candidates,
            });
        }
        return Ok(SurveyLayout::Raw {
            client,
            timestamp,
            question_columns,
        });
    }

    match (category, score) {
        (Some(category), Some(score)) => Ok(SurveyLayout::Standardized {
            client,
            category,
            score,
            question,
            timestamp,
        }),
        (category, score) => {
            let mut missing = Vec::new();
            if category.is_none() {
                missing.push("category");
            }
            if score.is_none() {
                missing.push("score");
            }
            Err(SurveyError::Schema(format!(
                "standardized survey is missing required column(s): {}",
                missing.join(", ")
            )))
        }
    }
}

fn find_column(keys: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| keys.iter().position(|k| k == alias))
}

fn resolve_question_columns(
    table: &RawTable,
    map: &QuestionMap,
    client: usize,
    timestamp: Option<usize>,
) -> Vec<QuestionColumn> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != client && Some(*i) != timestamp)
        .filter_map(|(index, header)| {
            let header = normalize_text(header);
            match map.resolve(&header) {
                Some(resolved) => Some(QuestionColumn {
                    index,
                    header,
                    resolved: Some(resolved.clone()),
                }),
                None if question_id_prefix(&header).is_some() => Some(QuestionColumn {
                    index,
                    header,
                    resolved: None,
                }),
                None => None,
            }
        })
        .collect()
}

fn melt_raw(
    table: &RawTable,
    client_col: usize,
    timestamp_col: Option<usize>,
    question_columns: &[QuestionColumn],
) -> Result<(Vec<SurveyRecord>, NormalizationReport), SurveyError> {
    let mut report = NormalizationReport::default();
    let mut records = Vec::new();
    let mut unresolved = Unresolved::default();

    for row in 0..table.rows.len() {
        report.rows_read += 1;
        let Some(client) = client_name(table.cell(row, client_col)) else {
            report.dropped_missing_client += 1;
            continue;
        };
        let timestamp = timestamp_col.and_then(|c| parse_timestamp(table.cell(row, c)));

        for column in question_columns {
            let Some(score) = table.cell(row, column.index).as_number() else {
                report.dropped_missing_score += 1;
                continue;
            };
            match &column.resolved {
                Some(resolved) => records.push(SurveyRecord {
                    client: client.clone(),
                    question: resolved.id.clone(),
                    category: resolved.category,
                    score,
                    timestamp,
                }),
                None => unresolved.push(&column.header),
            }
        }
    }

    unresolved.into_result()?;
    report.records = records.len();
    Ok((records, report))
}

#[allow(clippy::too_many_arguments)]
fn read_standardized(
    table: &RawTable,
    map: &QuestionMap,
    client_col: usize,
    category_col: usize,
    score_col: usize,
    question_col: Option<usize>,
    timestamp_col: Option<usize>,
) -> Result<(Vec<SurveyRecord>, NormalizationReport), SurveyError> {
    let mut report = NormalizationReport::default();
    let mut records = Vec::new();
    let mut unresolved = Unresolved::default();

    for row in 0..table.rows.len() {
        report.rows_read += 1;
        let Some(client) = client_name(table.cell(row, client_col)) else {
            report.dropped_missing_client += 1;
            continue;
        };
        let Some(score) = table.cell(row, score_col).as_number() else {
            report.dropped_missing_score += 1;
            continue;
        };

        let category_text = table.cell(row, category_col).as_text().map(|t| normalize_text(&t));
        let question_text = question_col
            .and_then(|c| table.cell(row, c).as_text())
            .map(|t| normalize_text(&t));

        let category = match (&category_text, &question_text) {
            (Some(cat), _) => Dimension::parse(cat),
            (None, Some(q)) => map.resolve(q).map(|r| r.category),
            (None, None) => None,
        };
        let Some(category) = category else {
            let label = category_text
                .or(question_text)
                .unwrap_or_else(|| format!("row {}", row + 2));
            unresolved.push(&label);
            continue;
        };

        records.push(SurveyRecord {
            client,
            question: question_text.unwrap_or_else(|| category.label().to_string()),
            category,
            score,
            timestamp: timestamp_col.and_then(|c| parse_timestamp(table.cell(row, c))),
        });
    }

    unresolved.into_result()?;
    report.records = records.len();
    Ok((records, report))
}

fn client_name(cell: &Cell) -> Option<String> {
    cell.as_text()
        .map(|t| normalize_text(&t))
        .filter(|t| !t.is_empty())
}

fn ignored_columns(table: &RawTable, layout: &SurveyLayout) -> Vec<String> {
    let used: BTreeSet<usize> = match layout {
        SurveyLayout::Raw {
            client,
            timestamp,
            question_columns,
        } => std::iter::once(*client)
            .chain(*timestamp)
            .chain(question_columns.iter().map(|c| c.index))
            .collect(),
        SurveyLayout::Standardized {
            client,
            category,
            score,
            question,
            timestamp,
        } => [*client, *category, *score]
            .into_iter()
            .chain(*question)
            .chain(*timestamp)
            .collect(),
    };
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !used.contains(i) && !h.trim().is_empty())
        .map(|(_, h)| normalize_text(h))
        .collect()
}

/// Parses common survey-export timestamp formats. Unparseable values yield `None`.
pub fn parse_timestamp(cell: &Cell) -> Option<NaiveDateTime> {
    let text = cell.as_text()?;
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Unresolved question identifiers, de-duplicated in first-seen order.
#[derive(Default)]
struct Unresolved(Vec<String>);

impl Unresolved {
    fn push(&mut self, label: &str) {
        if !self.0.iter().any(|existing| existing == label) {
            self.0.push(label.to_string());
        }
    }

    fn into_result(self) -> Result<(), SurveyError> {
        if self.0.is_empty() {
            return Ok(());
        }
        Err(SurveyError::Mapping {
            message: format!(
                "{} question(s) could not be mapped to a dimension",
                self.0.len()
            ),
            unresolved: self.0,
        })
    }
}
