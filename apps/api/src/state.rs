use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::survey::QuestionMap;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only reference map, loaded once at startup.
    pub question_map: Arc<QuestionMap>,
    /// Text-generation backend. `LlmClient` in production, a mock in tests.
    pub generator: Arc<dyn TextGenerator>,
}
