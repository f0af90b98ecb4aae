//! Document loading for job descriptions and CVs
//!
//! CVs may be Word documents or plain text; job descriptions are plain text
//! given inline, from a file, or on stdin.

pub mod docx;

use crate::domain::models::{DocumentKind, SourceDocument};
use crate::error::{AppError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where the job description comes from
#[derive(Debug, Clone)]
pub enum JdSource {
    Inline(String),
    File(PathBuf),
    Stdin,
}

/// Detect the document kind from the file extension
pub fn detect_kind(path: &Path) -> DocumentKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("docx") => DocumentKind::Docx,
        _ => DocumentKind::PlainText,
    }
}

/// Read a plain text file, lowercased
pub fn read_plain_text(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)?;
    Ok(text.to_lowercase())
}

fn ensure_not_empty(document: SourceDocument, what: &str) -> Result<SourceDocument> {
    if document.text.trim().is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{} is empty ({})",
            what, document.origin
        )));
    }
    Ok(document)
}

/// Load a candidate CV
pub fn load_cv(path: &Path) -> Result<SourceDocument> {
    let kind = detect_kind(path);
    log::info!("Loading CV from {} as {}", path.display(), kind);

    let text = match kind {
        DocumentKind::Docx => docx::read_docx(path)?,
        DocumentKind::PlainText => read_plain_text(path)?,
    };

    ensure_not_empty(
        SourceDocument::new(kind, path.display().to_string(), text),
        "CV",
    )
}

/// Load a job description; `stdin` is only read for `JdSource::Stdin`
pub fn load_job_description<R: Read>(source: &JdSource, stdin: R) -> Result<SourceDocument> {
    let document = match source {
        JdSource::Inline(text) => {
            SourceDocument::new(DocumentKind::PlainText, "inline", text.clone())
        }
        JdSource::File(path) => SourceDocument::new(
            DocumentKind::PlainText,
            path.display().to_string(),
            std::fs::read_to_string(path)?,
        ),
        JdSource::Stdin => {
            let mut text = String::new();
            let mut stdin = stdin;
            stdin.read_to_string(&mut text)?;
            SourceDocument::new(DocumentKind::PlainText, "stdin", text)
        }
    };

    log::debug!(
        "Loaded job description from {} ({} bytes)",
        document.origin,
        document.text.len()
    );
    ensure_not_empty(document, "Job description")
}
