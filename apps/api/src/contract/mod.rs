// Contract workflow: classify → template → populate → risk check → finalize.
// All completion calls go through llm_client::Completion; no direct HTTP here.

pub mod handlers;
pub mod pipeline;
pub mod placeholders;
pub mod prompts;
