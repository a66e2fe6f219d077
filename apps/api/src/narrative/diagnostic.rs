//! Structured diagnostic response: parsing and validation.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::llm_client::strip_json_fences;
use crate::models::Dimension;
use crate::narrative::NarrativeError;

pub const CEO_MOVES: usize = 3;
const KNOWN_KEYS: [&str; 3] = ["story", "dimension_notes", "ceo_moves"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeResult {
    pub story: String,
    pub dimension_notes: BTreeMap<Dimension, String>,
    pub ceo_moves: Vec<String>,
}

impl NarrativeResult {
    /// Note for one dimension; empty when the model did not provide one.
    pub fn note_for(&self, dimension: Dimension) -> &str {
        self.dimension_notes
            .get(&dimension)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Parses the model's JSON answer. Anything short of the full contract is a
/// `NarrativeError::Parse`, which callers surface as "regenerate".
pub fn parse_diagnostic(raw: &str) -> Result<NarrativeResult, NarrativeError> {
    let text = strip_json_fences(raw);
    let value: Value = serde_json::from_str(text)
        .map_err(|e| NarrativeError::Parse(format!("response is not valid JSON: {e}")))?;
    let Value::Object(object) = value else {
        return Err(NarrativeError::Parse(
            "response is not a JSON object".to_string(),
        ));
    };

    for key in object.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        warn!("Ignoring unexpected key '{}' in diagnostic response", key);
    }

    let story = required(&object, "story")?
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NarrativeError::Parse("'story' must be a non-empty string".to_string()))?;

    let notes = required(&object, "dimension_notes")?
        .as_object()
        .ok_or_else(|| NarrativeError::Parse("'dimension_notes' must be an object".to_string()))?;
    let mut dimension_notes = BTreeMap::new();
    for (name, note) in notes {
        let Some(dimension) = Dimension::parse(name) else {
            warn!("Ignoring note for unknown dimension '{}'", name);
            continue;
        };
        let note = note.as_str().ok_or_else(|| {
            NarrativeError::Parse(format!("note for '{name}' must be a string"))
        })?;
        dimension_notes.insert(dimension, note.trim().to_string());
    }

    let moves = required(&object, "ceo_moves")?
        .as_array()
        .ok_or_else(|| NarrativeError::Parse("'ceo_moves' must be an array".to_string()))?;
    if moves.len() != CEO_MOVES {
        return Err(NarrativeError::Parse(format!(
            "'ceo_moves' must contain exactly {CEO_MOVES} entries, got {}",
            moves.len()
        )));
    }
    let ceo_moves = moves
        .iter()
        .map(|m| {
            m.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| NarrativeError::Parse("'ceo_moves' entries must be strings".to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NarrativeResult {
        story,
        dimension_notes,
        ceo_moves,
    })
}

fn required<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value, NarrativeError> {
    object
        .get(key)
        .ok_or_else(|| NarrativeError::Parse(format!("missing required key '{key}'")))
}
