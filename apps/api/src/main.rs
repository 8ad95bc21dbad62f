mod config;
mod contract;
mod errors;
mod export;
mod ingest;
mod llm_client;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::templates::TemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing OPENAI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting autocon v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        config.model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?
    .with_retry_policy(config.llm_max_retries, Duration::from_millis(1000));
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize template store; a missing default template is not fatal
    let templates = TemplateStore::open(&config.template_dir).await?;
    if let Err(e) = templates.ensure_default(&llm).await {
        warn!("Could not generate default template: {e}");
    }
    info!("Template store ready at {}", templates.dir().display());

    let state = AppState {
        llm: Arc::new(llm),
        templates: Arc::new(templates),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
