use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::ingest::{read_upload, ExtractedProposal};
use crate::state::AppState;

/// Multipart field carrying the proposal file.
const FILE_FIELD: &str = "file";

/// POST /api/v1/proposals/extract
///
/// Accepts a multipart upload with a `file` field (PDF or plain text)
/// and returns the proposal text for review before processing.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractedProposal>, AppError> {
    let limit = state.config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| upload_error(e, limit))?;

        info!(
            "Extracting proposal from upload {:?} ({} bytes)",
            file_name.as_deref().unwrap_or("<unnamed>"),
            bytes.len()
        );

        let extracted = read_upload(file_name.as_deref(), content_type.as_deref(), bytes).await?;
        return Ok(Json(extracted));
    }

    Err(AppError::Validation(format!(
        "multipart body must include a '{FILE_FIELD}' field"
    )))
}

/// Names the configured limit when the body limit cut the upload short.
fn upload_error(e: MultipartError, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected upload over the {limit}-byte limit");
        AppError::PayloadTooLarge(format!("upload exceeds the {limit}-byte limit"))
    } else {
        AppError::Upload(e)
    }
}
