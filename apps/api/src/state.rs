use std::sync::Arc;

use crate::config::Config;
use crate::jobs::JobSearch;
use crate::llm_client::CompletionProvider;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable; no per-user data lives here.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. Default: `LlmClient` (OpenAI chat completions).
    pub llm: Arc<dyn CompletionProvider>,
    /// Job-search backend. `None` when no search credential is configured.
    pub job_search: Option<Arc<dyn JobSearch>>,
    pub config: Config,
}
