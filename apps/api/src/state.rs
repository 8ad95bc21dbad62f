use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Completion;
use crate::templates::TemplateStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production, scripted in tests.
    pub llm: Arc<dyn Completion>,
    pub templates: Arc<TemplateStore>,
    pub config: Config,
}
