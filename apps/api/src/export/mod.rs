// Document export: the final contract as Word (.docx) or PDF.
// Both formats open with the same title and "Generated on" line.

pub mod docx;
pub mod handlers;
pub mod metrics;
pub mod pdf;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::errors::AppError;

pub const DOCUMENT_TITLE: &str = "Legal Contract";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Word document generation failed: {0}")]
    Docx(String),
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Internal(anyhow::Error::new(e))
    }
}

/// Output formats offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn render(self, contract: &str, generated_at: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Docx => docx::render_docx(contract, generated_at),
            ExportFormat::Pdf => pdf::render_pdf(contract, generated_at),
        }
    }
}

pub fn generated_on_line(generated_at: NaiveDateTime) -> String {
    format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))
}

/// Download file name, e.g. `contract_20250301_093000.pdf`.
pub fn download_file_name(format: ExportFormat, generated_at: NaiveDateTime) -> String {
    format!(
        "contract_{}.{}",
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_download_file_names() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        assert_eq!(download_file_name(ExportFormat::Pdf, at), "contract_20250301_090507.pdf");
        assert_eq!(download_file_name(ExportFormat::Docx, at), "contract_20250301_090507.docx");
        assert_eq!(generated_on_line(at), "Generated on: 2025-03-01 09:05:07");
    }
}
