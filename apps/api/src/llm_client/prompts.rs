// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for free-text calls that must return a single sentence.
pub const PLAIN_SENTENCE_SYSTEM: &str = "You are a precise assistant. \
    Respond with the requested text only. \
    Do NOT add a preamble, quotation marks, markdown or explanations.";

/// Tone line appended to every advisory prompt.
pub const BOARD_TONE: &str = "Tone: board-ready, direct, non-academic.";
