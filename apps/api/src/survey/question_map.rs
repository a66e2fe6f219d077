//! Static reference mapping question IDs and texts to dimensions.
//!
//! Loaded once at startup and shared read-only through `AppState`.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::models::{Dimension, QuestionDefinition, ResolvedQuestion};
use crate::survey::text::{match_key, normalize_text, question_id_prefix};

#[derive(Debug, Error)]
pub enum QuestionMapError {
    #[error("Failed to read question map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid question map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Question '{id}' has unknown category '{category}'")]
    UnknownCategory { id: String, category: String },

    #[error("Question key '{key}' maps to both {first} and {second}")]
    Conflict {
        key: String,
        first: Dimension,
        second: Dimension,
    },

    #[error("Question map is empty")]
    Empty,
}

/// Immutable lookup from normalized question identifier to dimension.
#[derive(Debug, Clone)]
pub struct QuestionMap {
    by_id: HashMap<String, ResolvedQuestion>,
    by_text: HashMap<String, ResolvedQuestion>,
}

impl QuestionMap {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuestionMapError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| QuestionMapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let map = Self::from_json(&raw)?;
        info!(
            "Loaded question map from {} ({} questions)",
            path.display(),
            map.len()
        );
        Ok(map)
    }

    pub fn from_json(raw: &str) -> Result<Self, QuestionMapError> {
        let definitions: Vec<QuestionDefinition> = serde_json::from_str(raw)?;
        Self::from_definitions(definitions)
    }

    pub fn from_definitions(
        definitions: impl IntoIterator<Item = QuestionDefinition>,
    ) -> Result<Self, QuestionMapError> {
        let mut by_id = HashMap::new();
        let mut by_text = HashMap::new();

        for def in definitions {
            let category =
                Dimension::parse(&def.category).ok_or_else(|| QuestionMapError::UnknownCategory {
                    id: def.id.clone(),
                    category: def.category.clone(),
                })?;
            let resolved = ResolvedQuestion {
                id: normalize_text(&def.id),
                category,
            };
            insert_unique(&mut by_id, match_key(&def.id), resolved.clone())?;
            if !def.text.trim().is_empty() {
                insert_unique(&mut by_text, match_key(&def.text), resolved)?;
            }
        }

        if by_id.is_empty() {
            return Err(QuestionMapError::Empty);
        }
        Ok(QuestionMap { by_id, by_text })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Resolves a wide-format header or a long-format question cell.
    ///
    /// Tries, in order: the whole value as an ID, its leading ID token
    /// (`"Q3. I trust my peers"` → `Q3`), and the full normalized text.
    pub fn resolve(&self, value: &str) -> Option<&ResolvedQuestion> {
        let key = match_key(value);
        if let Some(hit) = self.by_id.get(&key) {
            return Some(hit);
        }
        if let Some(hit) = question_id_prefix(&key).and_then(|id| self.by_id.get(id)) {
            return Some(hit);
        }
        self.by_text.get(&key)
    }
}

fn insert_unique(
    map: &mut HashMap<String, ResolvedQuestion>,
    key: String,
    value: ResolvedQuestion,
) -> Result<(), QuestionMapError> {
    if let Some(existing) = map.get(&key) {
        if existing.category != value.category {
            return Err(QuestionMapError::Conflict {
                key,
                first: existing.category,
                second: value.category,
            });
        }
        return Ok(());
    }
    map.insert(key, value);
    Ok(())
}
