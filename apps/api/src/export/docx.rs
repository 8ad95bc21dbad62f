//! Word export: title run, timestamp paragraph, one paragraph per contract line.

use std::io::Cursor;

use chrono::NaiveDateTime;
use docx_rs::{Docx, Paragraph, Run};

use crate::export::{generated_on_line, ExportError, DOCUMENT_TITLE};

/// Title size in half-points (16pt).
const TITLE_SIZE: usize = 32;

/// Renders `contract` as a `.docx` package and returns the file bytes.
pub fn render_docx(contract: &str, generated_at: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(DOCUMENT_TITLE)
                    .bold()
                    .size(TITLE_SIZE),
            ),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(generated_on_line(generated_at))));

    for line in contract.lines() {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(xml_safe(line))));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Drops characters XML 1.0 cannot carry: control characters (form feeds from PDF
/// extraction and the like) and the noncharacters U+FFFE and U+FFFF.
/// Tabs are expanded so they survive as visible spacing.
fn xml_safe(line: &str) -> String {
    line.chars()
        .flat_map(|c| match c {
            '\t' => vec![' '; 4],
            c if c.is_control() => vec![],
            '\u{fffe}' | '\u{ffff}' => vec![],
            c => vec![c],
        })
        .collect()
}
