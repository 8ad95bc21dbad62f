//! PDF export: US Letter pages, Helvetica, one text operation per printed line.

use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::export::metrics::{encode_win_ansi, wrap_line};
use crate::export::{generated_on_line, ExportError, DOCUMENT_TITLE};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 40;

const TITLE_SIZE: i64 = 16;
const TIMESTAMP_SIZE: i64 = 10;
const BODY_SIZE: i64 = 12;
const BODY_LEADING: i64 = 15;
/// Gap below the title and below the timestamp.
const HEADER_GAP: i64 = 30;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Renders `contract` as a PDF and returns the file bytes.
///
/// Layout: bold title, timestamp line, then body lines at fixed leading,
/// word-wrapped to the text width. A new page starts whenever the cursor
/// drops below the bottom margin.
pub fn render_pdf(contract: &str, generated_at: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
    let text_width = (PAGE_WIDTH - 2 * MARGIN) as f32;
    let mut pages: Vec<Vec<Operation>> = Vec::new();
    let mut ops: Vec<Operation> = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    push_text(&mut ops, BOLD_FONT, TITLE_SIZE, y, encode_win_ansi(DOCUMENT_TITLE));
    y -= HEADER_GAP;
    push_text(
        &mut ops,
        REGULAR_FONT,
        TIMESTAMP_SIZE,
        y,
        encode_win_ansi(&generated_on_line(generated_at)),
    );
    y -= HEADER_GAP;

    for line in contract.lines() {
        for piece in wrap_line(&encode_win_ansi(line), BODY_SIZE as f32, text_width) {
            if y < MARGIN {
                pages.push(std::mem::take(&mut ops));
                y = PAGE_HEIGHT - MARGIN;
            }
            push_text(&mut ops, REGULAR_FONT, BODY_SIZE, y, piece);
            y -= BODY_LEADING;
        }
    }
    pages.push(ops);

    build_document(pages)
}

/// Appends a single positioned text line.
fn push_text(ops: &mut Vec<Operation>, font: &str, size: i64, y: i64, text: Vec<u8>) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), Object::Integer(size)]));
    ops.push(Operation::new(
        "Td",
        vec![Object::Integer(MARGIN), Object::Integer(y)],
    ));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
}

fn build_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });
    let media_box = || -> Object {
        vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ]
        .into()
    };

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => media_box(),
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => media_box(),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(buf)
}
