//! DOCX text extraction
//!
//! A DOCX file is a zip archive; the body lives in `word/document.xml`.
//! Paragraph text is rebuilt from `<w:t>` runs, with tabs and line breaks
//! kept.

use crate::error::{AppError, Result};
use regex::Regex;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Read a DOCX file and return its lowercased paragraph text
pub fn read_docx(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let text = read_docx_from(file)?;
    log::info!(
        "Extracted {} characters from {}",
        text.chars().count(),
        path.display()
    );
    Ok(text.to_lowercase())
}

/// Extract paragraph text from any seekable DOCX stream
pub fn read_docx_from<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = ZipArchive::new(reader)?;
    let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
        ZipError::FileNotFound => {
            AppError::Document(format!("Not a Word document: missing {}", DOCUMENT_PART))
        }
        other => AppError::Zip(other),
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    extract_paragraphs(&xml)
}

/// Turn WordprocessingML into newline-separated paragraphs
///
/// Body and table-cell paragraphs are read. Text boxes (`w:txbxContent`)
/// nest whole paragraphs inside a run and are dropped before matching, so an
/// outer paragraph keeps the runs on both sides of the box.
pub fn extract_paragraphs(xml: &str) -> Result<String> {
    let text_box_re = Regex::new(r"(?s)<w:txbxContent\b.*?</w:txbxContent>")
        .map_err(|e| AppError::Document(e.to_string()))?;
    let xml = text_box_re.replace_all(xml, "");

    let paragraph_re = Regex::new(r"(?s)<w:p\b[^>]*?(?:/>|>(.*?)</w:p>)")
        .map_err(|e| AppError::Document(e.to_string()))?;
    let run_re = Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab\s*/>|<w:br\b[^>]*/>")
        .map_err(|e| AppError::Document(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for paragraph in paragraph_re.captures_iter(&xml) {
        let body = paragraph.get(1).map_or("", |m| m.as_str());
        let mut text = String::new();
        for run in run_re.captures_iter(body) {
            match run.get(1) {
                Some(t) => text.push_str(&decode_entities(t.as_str())),
                None if run[0].starts_with("<w:tab") => text.push('\t'),
                None => text.push('\n'),
            }
        }
        paragraphs.push(text);
    }

    Ok(paragraphs.join("\n"))
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Build an in-memory DOCX with the given document.xml body
    pub(crate) fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn wrap_body(paragraphs: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            paragraphs
        )
    }

    #[test]
    fn test_extract_paragraphs_joins_runs() {
        let xml = wrap_body(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Jane</w:t></w:r><w:r><w:t xml:space="preserve"> Doe</w:t></w:r></w:p><w:p><w:r><w:t>SQL &amp; Python</w:t></w:r></w:p>"#,
        );
        assert_eq!(extract_paragraphs(&xml).unwrap(), "Jane Doe\nSQL & Python");
    }

    #[test]
    fn test_extract_paragraphs_tabs_breaks_and_empty() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p><w:p/><w:p w:rsidR="00AB"><w:r><w:t>d</w:t></w:r></w:p>"#,
        );
        assert_eq!(extract_paragraphs(&xml).unwrap(), "a\tb\nc\n\nd");
    }

    #[test]
    fn test_extract_paragraphs_skips_text_box_content() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>a</w:t></w:r><w:r><w:pict><v:shape><v:textbox><w:txbxContent><w:p><w:r><w:t>box</w:t></w:r></w:p></w:txbxContent></v:textbox></v:shape></w:pict></w:r><w:r><w:t>c</w:t></w:r></w:p><w:p><w:r><w:t>d</w:t></w:r></w:p>"#,
        );
        assert_eq!(extract_paragraphs(&xml).unwrap(), "ac\nd");
    }

    #[test]
    fn test_extract_paragraphs_reads_table_cells() {
        let xml = wrap_body(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>SQL</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>after</w:t></w:r></w:p>"#,
        );
        assert_eq!(extract_paragraphs(&xml).unwrap(), "SQL\nafter");
    }

    #[test]
    fn test_decode_entities_order() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&lt;b&gt; &quot;x&quot; it&apos;s"), "<b> \"x\" it's");
    }

    #[test]
    fn test_read_docx_from_archive() {
        let bytes = docx_bytes(&wrap_body(
            r#"<w:p><w:r><w:t>Led Power BI dashboards</w:t></w:r></w:p>"#,
        ));
        let text = read_docx_from(Cursor::new(bytes)).unwrap();
        assert_eq!(text, "Led Power BI dashboards");
    }

    #[test]
    fn test_read_docx_lowercases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(
            &path,
            docx_bytes(&wrap_body(r#"<w:p><w:r><w:t>SQL Expert</w:t></w:r></w:p>"#)),
        )
        .unwrap();
        assert_eq!(read_docx(&path).unwrap(), "sql expert");
    }

    #[test]
    fn test_archive_without_document_part() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("readme.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hi").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let result = read_docx_from(Cursor::new(bytes));
        assert!(matches!(result, Err(AppError::Document(_))));
    }

    #[test]
    fn test_not_a_zip() {
        let result = read_docx_from(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(AppError::Zip(_))));
    }
}
