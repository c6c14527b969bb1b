//! File-input extraction feeding the chunker.
//!
//! Resolves the extractor from the file extension, falling back to lossy
//! UTF-8 decoding for anything unrecognized.

use crate::error::{EngineError, Result};
use std::path::Path;

/// Extract normalizable text from `bytes`, using `filename`'s extension to
/// pick a format-specific extractor. Unknown/missing extensions fall back
/// to a lossy UTF-8 decode — this never fails (spec §4.3 "unknown
/// extensions fall back to UTF-8 text decoding with lossy error handling").
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "md" | "markdown" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "pdf" => extract_pdf(bytes),
        "docx" => extract_docx(bytes),
        _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| EngineError::invalid_input(format!("failed to extract PDF text: {e}")))
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| EngineError::invalid_input(format!("failed to read DOCX: {e}")))?;

    let mut out = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            for run_child in &p.children {
                if let docx_rs::ParagraphChild::Run(run) = run_child {
                    for text_child in &run.children {
                        if let docx_rs::RunChild::Text(t) = text_child {
                            out.push_str(&t.text);
                        }
                    }
                }
            }
            out.push('\n');
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_extension_passes_through() {
        let text = extract_text(b"hello world", "doc.txt").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn unknown_extension_falls_back_to_lossy_utf8() {
        let text = extract_text(b"plain bytes", "doc.xyz").unwrap();
        assert_eq!(text, "plain bytes");
    }

    #[test]
    fn markdown_extension_passes_through() {
        let text = extract_text(b"# Title\n\nBody.", "doc.md").unwrap();
        assert!(text.contains("# Title"));
    }
}
