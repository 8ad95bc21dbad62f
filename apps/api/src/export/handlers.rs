use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::{download_file_name, ExportFormat};

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub contract: String,
}

/// POST /api/v1/contracts/export/docx
pub async fn handle_export_docx(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    export(ExportFormat::Docx, request).await
}

/// POST /api/v1/contracts/export/pdf
pub async fn handle_export_pdf(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    export(ExportFormat::Pdf, request).await
}

/// Renders on the blocking pool and returns the file as an attachment.
async fn export(format: ExportFormat, request: ExportRequest) -> Result<Response, AppError> {
    if request.contract.trim().is_empty() {
        return Err(AppError::Validation("contract cannot be empty".to_string()));
    }

    let generated_at = Local::now().naive_local();
    let contract = request.contract;
    let bytes = tokio::task::spawn_blocking(move || format.render(&contract, generated_at))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("export task failed: {e}")))??;

    let file_name = download_file_name(format, generated_at);
    info!("Exported {} ({} bytes)", file_name, bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
