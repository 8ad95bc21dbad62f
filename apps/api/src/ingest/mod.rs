//! Proposal ingestion: turns an uploaded PDF or text file into proposal text.
//!
//! PDF parsing is CPU-bound and runs on the blocking pool. The parser is
//! third-party code fed with user bytes, so a panic inside it is caught there
//! and reported as an unreadable file.

pub mod handlers;

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("file is not valid UTF-8 text; upload a .txt or .pdf file")]
    NotUtf8,

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("no extractable text found in the file")]
    NoText,
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Empty | IngestError::NotUtf8 => AppError::Validation(e.to_string()),
            IngestError::Pdf(_) | IngestError::NoText => {
                AppError::UnprocessableEntity(e.to_string())
            }
        }
    }
}

/// How the proposal text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalSource {
    Pdf,
    Text,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedProposal {
    pub text: String,
    pub source: ProposalSource,
    pub char_count: usize,
}

/// Decides whether an upload is a PDF from its content type, extension or magic bytes.
pub fn is_pdf(file_name: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> bool {
    content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || file_name.is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        || bytes.starts_with(PDF_MAGIC)
}

/// Reads an uploaded proposal file into text.
pub async fn read_upload(
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<ExtractedProposal, IngestError> {
    if bytes.is_empty() {
        return Err(IngestError::Empty);
    }

    let (text, source) = if is_pdf(file_name, content_type, &bytes) {
        (extract_pdf_text(bytes).await?, ProposalSource::Pdf)
    } else {
        (decode_text(&bytes)?, ProposalSource::Text)
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(IngestError::NoText);
    }

    debug!("Ingested {:?} proposal ({} chars)", source, text.chars().count());
    Ok(ExtractedProposal {
        char_count: text.chars().count(),
        text,
        source,
    })
}

/// Extracts the text of every page of a PDF, pages separated by newlines.
pub async fn extract_pdf_text(bytes: Bytes) -> Result<String, IngestError> {
    let joined =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;
    parser_outcome(joined)
}

/// Maps a finished parser task to text, turning a parser panic into `IngestError::Pdf`.
fn parser_outcome<E: fmt::Display>(
    joined: Result<Result<String, E>, JoinError>,
) -> Result<String, IngestError> {
    let parsed = joined.map_err(|e| {
        warn!("PDF parser aborted: {e}");
        IngestError::Pdf("the PDF parser could not process this file".to_string())
    })?;
    parsed.map_err(|e| IngestError::Pdf(e.to_string()))
}

/// Decodes a plain-text upload, tolerating a UTF-8 byte-order mark.
fn decode_text(bytes: &[u8]) -> Result<String, IngestError> {
    let text = String::from_utf8(bytes.to_vec()).map_err(|_| IngestError::NotUtf8)?;
    Ok(text
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(text))
}
