//! Axum route handlers for the template store.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;
use crate::templates::template_slug;

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveTemplateRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SaveTemplateResponse {
    pub name: String,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    Json(TemplateListResponse {
        templates: state.templates.names().await,
    })
}

/// GET /api/v1/templates/:name
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TemplateResponse>, AppError> {
    let content = state
        .templates
        .get(&name)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Template '{name}' not found")))?;

    Ok(Json(TemplateResponse {
        name: template_slug(&name),
        content,
    }))
}

/// PUT /api/v1/templates/:name
///
/// Creates or replaces a template. The response carries the slug actually written.
pub async fn handle_save_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<SaveTemplateRequest>,
) -> Result<Json<SaveTemplateResponse>, AppError> {
    let name = state.templates.save(&name, &request.content).await?;
    Ok(Json(SaveTemplateResponse { name }))
}
