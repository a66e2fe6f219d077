// Prompts for the executive diagnostic and the radar-chart insight sentence.

use crate::llm_client::prompts::BOARD_TONE;

/// Structured diagnostic: story, one note per dimension, three CEO moves.
pub fn diagnostic_prompt(scores_json: &str) -> String {
    format!(
        r#"You are an executive team effectiveness advisor.

Based on the TEAMS scores below, produce a concise executive diagnostic.
Scores are means on a 1-5 scale; null means no respondent answered that dimension.

TEAMS scores:
{scores_json}

STRICT OUTPUT FORMAT (JSON ONLY, no markdown, no commentary):

{{
  "story": "One concise paragraph (4-5 sentences) describing overall team dynamics and execution risk.",
  "dimension_notes": {{
    "Trust": "One short, direct interpretation.",
    "Empathy": "One short, direct interpretation.",
    "Alignment": "One short, direct interpretation.",
    "Meaning / Purpose": "One short, direct interpretation.",
    "Psychological Safety": "One short, direct interpretation."
  }},
  "ceo_moves": [
    "I will ...",
    "I will ...",
    "I will ..."
  ]
}}

{BOARD_TONE}"#
    )
}

/// One neutral sentence interpreting the radar pattern.
pub fn insight_prompt(scores_json: &str) -> String {
    format!(
        r#"You are an executive advisor.

Based on the TEAMS scores below, write ONE concise sentence (max 20 words)
interpreting the overall pattern shown in a radar chart.

TEAMS scores:
{scores_json}

Rules:
- One sentence only
- No recommendations
- No labels (e.g. "Overall")
- Board-ready, precise, neutral tone"#
    )
}
