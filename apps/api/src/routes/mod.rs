pub mod health;
pub mod ui;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::contract::handlers as contract_handlers;
use crate::export::handlers as export_handlers;
use crate::ingest::handlers as ingest_handlers;
use crate::state::AppState;
use crate::templates::handlers as template_handlers;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health::health_handler))
        // Proposal ingestion
        .route(
            "/api/v1/proposals/extract",
            post(ingest_handlers::handle_extract),
        )
        // Template store
        .route(
            "/api/v1/templates",
            get(template_handlers::handle_list_templates),
        )
        .route(
            "/api/v1/templates/:name",
            get(template_handlers::handle_get_template).put(template_handlers::handle_save_template),
        )
        // Contract workflow
        .route(
            "/api/v1/contracts/process",
            post(contract_handlers::handle_process),
        )
        .route(
            "/api/v1/contracts/analyze",
            post(contract_handlers::handle_analyze),
        )
        .route(
            "/api/v1/contracts/export/docx",
            post(export_handlers::handle_export_docx),
        )
        .route(
            "/api/v1/contracts/export/pdf",
            post(export_handlers::handle_export_pdf),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
