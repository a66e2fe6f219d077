//! Per-dimension mean scores in canonical order.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::{Dimension, SurveyRecord};

/// Mean score for one dimension. `score` is `None` when nobody answered a
/// question in that dimension; it is never coerced to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: Option<f64>,
    pub responses: usize,
}

/// Five entries, always in `Dimension::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMapping {
    entries: Vec<DimensionScore>,
}

impl ScoreMapping {
    /// Builds a mapping from explicit scores; dimensions not listed get `None`.
    #[cfg(test)]
    pub fn from_scores(scores: impl IntoIterator<Item = (Dimension, f64)>) -> Self {
        let given: BTreeMap<Dimension, f64> = scores.into_iter().collect();
        ScoreMapping {
            entries: Dimension::ALL
                .into_iter()
                .map(|dimension| DimensionScore {
                    dimension,
                    score: given.get(&dimension).copied().map(round2),
                    responses: usize::from(given.contains_key(&dimension)),
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[DimensionScore] {
        &self.entries
    }

    #[cfg(test)]
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.dimension == dimension)
            .and_then(|e| e.score)
    }

    /// Dimensions that have data, in canonical order.
    pub fn present(&self) -> Vec<(Dimension, f64)> {
        self.entries
            .iter()
            .filter_map(|e| e.score.map(|s| (e.dimension, s)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.score.is_none())
    }

    /// JSON object in canonical order, `null` for dimensions without data.
    /// This is the context handed to the text-generation prompts.
    pub fn to_json_value(&self) -> Value {
        let mut object = Map::new();
        for entry in &self.entries {
            let value = entry
                .score
                .map(Value::from)
                .unwrap_or(Value::Null);
            object.insert(entry.dimension.label().to_string(), value);
        }
        Value::Object(object)
    }
}

impl Serialize for ScoreMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Groups records by dimension, averages, rounds to 2 decimals and reindexes onto
/// the canonical dimension order.
pub fn aggregate(records: &[SurveyRecord]) -> ScoreMapping {
    let mut sums: BTreeMap<Dimension, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.category).or_insert((0.0, 0));
        entry.0 += record.score;
        entry.1 += 1;
    }

    ScoreMapping {
        entries: Dimension::ALL
            .into_iter()
            .map(|dimension| {
                let (sum, count) = sums.get(&dimension).copied().unwrap_or((0.0, 0));
                DimensionScore {
                    dimension,
                    score: (count > 0).then(|| round2(sum / count as f64)),
                    responses: count,
                }
            })
            .collect(),
    }
}

/// Rounds to 2 decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
