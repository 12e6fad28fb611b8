//! Plain-text PDF rendering with `lopdf`.
//!
//! Text is set in 12pt Helvetica on US-Letter pages starting at (50, 750),
//! one line every 20 units, wrapped greedily at 90 characters. Each `\n`
//! separated paragraph starts on a fresh line; a new page begins once the
//! next line would fall below the bottom margin.

use super::OutputError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const LEFT_MARGIN: i64 = 50;
const TOP_LINE: i64 = 750;
const BOTTOM_MARGIN: i64 = 50;
const LINE_HEIGHT: i64 = 20;
const FONT_SIZE: i64 = 12;
const WRAP_WIDTH: usize = 90;

/// Greedy word wrap. Empty paragraphs produce no line.
pub fn wrap_lines(blob: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in blob.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let len = line.chars().count();
            if line.is_empty() || len + 1 + word.chars().count() <= width {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

fn lines_per_page() -> usize {
    ((TOP_LINE - BOTTOM_MARGIN) / LINE_HEIGHT + 1) as usize
}

/// Helvetica uses a single-byte encoding; anything outside Latin-1 becomes `?`.
fn to_latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn page_content(lines: &[String]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        let y = TOP_LINE - LINE_HEIGHT * i as i64;
        operations.push(Operation::new(
            "Tm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                LEFT_MARGIN.into(),
                y.into(),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_latin1(line))],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

pub fn render(blob: &str) -> Result<Vec<u8>, OutputError> {
    let encode = |e: lopdf::Error| OutputError::Encode(e.to_string());

    let lines = wrap_lines(blob, WRAP_WIDTH);
    let mut pages: Vec<&[String]> = lines.chunks(lines_per_page()).collect();
    if pages.is_empty() {
        pages.push(&[]);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in &pages {
        let content = page_content(page_lines).encode().map_err(encode)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| OutputError::Encode(e.to_string()))?;
    Ok(bytes)
}
