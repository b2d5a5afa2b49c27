// CV document text extraction: PDF, DOCX and plain text uploads.
// Parsing is synchronous and CPU-bound; callers run it inside spawn_blocking.

pub mod handlers;

use std::io::{Cursor, ErrorKind, Read};
use std::path::Path;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const TXT_MIME: &str = "text/plain";
const DOCX_BODY_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}. Supported formats: PDF, DOCX, TXT")]
    UnsupportedType(String),

    #[error("Failed to parse {kind}: {message}")]
    Malformed { kind: &'static str, message: String },

    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    /// MIME type wins when it names a supported format; the file extension is the fallback.
    pub fn detect(filename: &str, content_type: Option<&str>) -> Option<Self> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let extension = Path::new(filename)
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        match (mime.as_str(), extension.as_str()) {
            (PDF_MIME, _) => Some(DocumentKind::Pdf),
            (DOCX_MIME, _) => Some(DocumentKind::Docx),
            (TXT_MIME, _) => Some(DocumentKind::Text),
            (_, "pdf") => Some(DocumentKind::Pdf),
            (_, "docx") => Some(DocumentKind::Docx),
            (_, "txt") => Some(DocumentKind::Text),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Text => "TXT",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn extract_text(
        &self,
        filename: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<String, DocumentError> {
        let kind = DocumentKind::detect(filename, content_type).ok_or_else(|| {
            DocumentError::UnsupportedType(
                content_type
                    .filter(|ct| !ct.is_empty())
                    .unwrap_or(filename)
                    .to_string(),
            )
        })?;

        let malformed = |message: String| DocumentError::Malformed {
            kind: kind.label(),
            message,
        };

        match kind {
            DocumentKind::Pdf => {
                pdf_extract::extract_text_from_mem(data).map_err(|e| malformed(e.to_string()))
            }
            DocumentKind::Docx => extract_docx_text(data, malformed),
            DocumentKind::Text => Ok(decode_text(data)),
        }
    }
}

/// UTF-8, falling back to Latin-1 (every byte maps to the code point of the same value).
fn decode_text(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => data.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Walks `word/document.xml` and joins the text of each `w:p` paragraph with newlines.
fn extract_docx_text(
    data: &[u8],
    malformed: impl Fn(String) -> DocumentError,
) -> Result<String, DocumentError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| malformed(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| malformed(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidData => malformed(e.to_string()),
            _ => DocumentError::Io(e),
        })?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                in_paragraph = true;
                current.clear();
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                paragraphs.push(current.trim().to_string());
                current.clear();
                in_paragraph = false;
            }
            Ok(Event::Empty(e)) if in_paragraph && e.name().as_ref() == b"w:tab" => {
                current.push('\t');
            }
            Ok(Event::Text(e)) if in_paragraph => {
                let text = e.xml_content().map_err(|e| malformed(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::GeneralRef(e)) if in_paragraph => {
                if let Some(ch) = e.resolve_char_ref().map_err(|e| malformed(e.to_string()))? {
                    current.push(ch);
                } else {
                    let name = e.decode().map_err(|e| malformed(e.to_string()))?;
                    if let Some(value) = resolve_predefined_entity(&name) {
                        current.push_str(value);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e.to_string())),
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}
