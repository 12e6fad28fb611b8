//! Minimal WordprocessingML (`.docx`) package.
//!
//! The package holds only the three parts Word needs to open a document: the
//! content-type map, the root relationship and `word/document.xml`. The whole
//! blob goes into one paragraph; line breaks become `<w:br/>`.

use super::OutputError;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p>"#;

const DOCUMENT_TAIL: &str = "</w:p></w:body></w:document>";

/// The body XML for `blob` as a single paragraph.
fn document_xml(blob: &str) -> String {
    let runs: Vec<String> = blob
        .split('\n')
        .map(|line| {
            // XML 1.0 forbids most control characters.
            let line: String = line.chars().filter(|c| !c.is_control() || *c == '\t').collect();
            format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(line.as_str()))
        })
        .collect();
    format!(
        "{DOCUMENT_HEAD}{}{DOCUMENT_TAIL}",
        runs.join("<w:r><w:br/></w:r>")
    )
}

pub fn render(blob: &str) -> Result<Vec<u8>, OutputError> {
    let encode = |e: zip::result::ZipError| OutputError::Encode(e.to_string());
    let io = |e: std::io::Error| OutputError::Encode(e.to_string());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options).map_err(encode)?;
    zip.write_all(CONTENT_TYPES.as_bytes()).map_err(io)?;
    zip.start_file("_rels/.rels", options).map_err(encode)?;
    zip.write_all(ROOT_RELS.as_bytes()).map_err(io)?;
    zip.start_file("word/document.xml", options).map_err(encode)?;
    zip.write_all(document_xml(blob).as_bytes()).map_err(io)?;

    let cursor = zip.finish().map_err(encode)?;
    Ok(cursor.into_inner())
}
