// Narrative Generator
// Implements: structured diagnostic call, visual-insight call, response parsing.

pub mod diagnostic;
pub mod insight;
pub mod prompts;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PLAIN_SENTENCE_SYSTEM};
use crate::llm_client::{CompletionRequest, LlmError, TextGenerator};
use crate::scoring::ScoreMapping;

pub use diagnostic::{parse_diagnostic, NarrativeResult};
pub use insight::clean_insight;

pub const DIAGNOSTIC_TEMPERATURE: f32 = 0.3;
pub const INSIGHT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum NarrativeError {
    /// The model answered but not in the agreed shape. Regenerating may help.
    #[error("Could not parse diagnostic response: {0}")]
    Parse(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Both generated texts for one report.
#[derive(Debug, Clone, Serialize)]
pub struct Narrative {
    pub diagnostic: NarrativeResult,
    pub insight: String,
}

pub async fn generate_diagnostic(
    generator: &dyn TextGenerator,
    scores: &ScoreMapping,
) -> Result<NarrativeResult, NarrativeError> {
    let request = CompletionRequest::new(
        prompts::diagnostic_prompt(&scores_context(scores)),
        DIAGNOSTIC_TEMPERATURE,
    )
    .with_system(JSON_ONLY_SYSTEM)
    .json();
    let raw = generator.complete(&request).await?;
    parse_diagnostic(&raw)
}

pub async fn generate_insight(
    generator: &dyn TextGenerator,
    scores: &ScoreMapping,
) -> Result<String, NarrativeError> {
    let request = CompletionRequest::new(
        prompts::insight_prompt(&scores_context(scores)),
        INSIGHT_TEMPERATURE,
    )
    .with_system(PLAIN_SENTENCE_SYSTEM);
    let sentence = clean_insight(&generator.complete(&request).await?);
    if sentence.is_empty() {
        return Err(LlmError::EmptyContent.into());
    }
    Ok(sentence)
}

/// Runs both calls concurrently. Each one runs to completion; a failure in one
/// does not cancel the other. The diagnostic error wins when both fail.
pub async fn generate_narrative(
    generator: &dyn TextGenerator,
    scores: &ScoreMapping,
) -> Result<Narrative, NarrativeError> {
    let (diagnostic, insight) = tokio::join!(
        generate_diagnostic(generator, scores),
        generate_insight(generator, scores)
    );

    match (diagnostic, insight) {
        (Ok(diagnostic), Ok(insight)) => {
            info!(
                "Narrative generated: story_chars={}, notes={}, insight_chars={}",
                diagnostic.story.len(),
                diagnostic.dimension_notes.len(),
                insight.len()
            );
            Ok(Narrative {
                diagnostic,
                insight,
            })
        }
        (Err(e), insight) => {
            error!("Diagnostic generation failed: {e}");
            if let Err(other) = insight {
                error!("Insight generation also failed: {other}");
            }
            Err(e)
        }
        (Ok(_), Err(e)) => {
            error!("Insight generation failed: {e}");
            Err(e)
        }
    }
}

fn scores_context(scores: &ScoreMapping) -> String {
    serde_json::to_string_pretty(&scores.to_json_value()).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::Dimension;

    pub(crate) const DIAGNOSTIC_JSON: &str = r#"{
        "story": "The executive team trusts each other but avoids hard conversations, which slows execution.",
        "dimension_notes": {
            "Trust": "Peers rely on each other's commitments.",
            "Empathy": "Perspectives are rarely explored before decisions.",
            "Alignment": "Priorities are shared but not consistently reinforced.",
            "Psychological Safety": "Challenge is muted in the room."
        },
        "ceo_moves": [
            "I will open each meeting with the hardest open issue.",
            "I will ask every peer for dissent before decisions.",
            "I will restate our three priorities monthly."
        ]
    }"#;

    /// Canned generator: answers JSON-mode requests with `diagnostic` and
    /// everything else with `insight`. Records the requests it saw.
    pub(crate) struct MockGenerator {
        pub diagnostic: Result<String, u16>,
        pub insight: Result<String, u16>,
        pub seen: Mutex<Vec<CompletionRequest>>,
    }

    impl MockGenerator {
        pub(crate) fn new(diagnostic: &str, insight: &str) -> Self {
            MockGenerator {
                diagnostic: Ok(diagnostic.to_string()),
                insight: Ok(insight.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn happy() -> Self {
            Self::new(
                DIAGNOSTIC_JSON,
                "\"Trust is the clear peak while empathy trails the rest.\"",
            )
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            let canned = if request.json_mode {
                &self.diagnostic
            } else {
                &self.insight
            };
            canned.clone().map_err(|status| LlmError::Api {
                status,
                message: "mock failure".to_string(),
            })
        }

        fn backend_name(&self) -> String {
            "mock".to_string()
        }
    }

    fn scores() -> ScoreMapping {
        ScoreMapping::from_scores([
            (Dimension::Trust, 4.2),
            (Dimension::Empathy, 2.1),
            (Dimension::Alignment, 3.0),
            (Dimension::PsychologicalSafety, 3.8),
        ])
    }

    #[tokio::test]
    async fn test_generate_narrative_happy_path() {
        let mock = MockGenerator::happy();
        let narrative = generate_narrative(&mock, &scores()).await.unwrap();

        assert_eq!(
            narrative.insight,
            "Trust is the clear peak while empathy trails the rest."
        );
        assert_eq!(narrative.diagnostic.ceo_moves.len(), 3);
        assert_eq!(narrative.diagnostic.note_for(Dimension::MeaningPurpose), "");

        let seen = mock.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let diagnostic = seen.iter().find(|r| r.json_mode).unwrap();
        assert_eq!(diagnostic.temperature, DIAGNOSTIC_TEMPERATURE);
        assert!(diagnostic.prompt.contains("\"Meaning / Purpose\": null"));
        let insight = seen.iter().find(|r| !r.json_mode).unwrap();
        assert_eq!(insight.temperature, INSIGHT_TEMPERATURE);
        assert!(insight.prompt.contains("max 20 words"));
    }

    #[tokio::test]
    async fn test_missing_moves_surfaces_parse_error() {
        let mock = MockGenerator::new(r#"{"story": "s", "dimension_notes": {}}"#, "Fine.");
        let err = generate_narrative(&mock, &scores()).await.unwrap_err();
        assert!(matches!(err, NarrativeError::Parse(_)));
        // The insight call still ran.
        assert_eq!(mock.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insight_failure_is_reported() {
        let mut mock = MockGenerator::happy();
        mock.insight = Err(503);
        let err = generate_narrative(&mock, &scores()).await.unwrap_err();
        assert!(matches!(err, NarrativeError::Llm(LlmError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_blank_insight_is_empty_content() {
        let mock = MockGenerator::new(DIAGNOSTIC_JSON, "  \"\" ");
        let err = generate_insight(&mock, &scores()).await.unwrap_err();
        assert!(matches!(err, NarrativeError::Llm(LlmError::EmptyContent)));
    }
}
