//! PDF extraction: an ordered list of independent strategies.
//!
//! Each strategy is tried in turn and its output must pass
//! [`is_valid_text`] before it is accepted; a PDF whose compressed streams
//! decode to garbage "succeeds" at the byte level but produces noise, and a
//! scanned PDF produces nothing at all. When every strategy fails or fails
//! validation the result is `None`, which is the expected outcome for
//! image-only documents.
//!
//! 1. `pdf-extract`: layout-aware text reconstruction over the whole
//!    document (output is bounded by the global character cap).
//! 2. `lopdf` text extraction over the first `max_pdf_pages` pages.
//! 3. Raw content-stream scan: string operands of `Tj`/`TJ`/`'`/`"`
//!    operators on the first `max_pdf_pages` pages, decoded best-effort.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object};

use crate::config::ExtractionConfig;
use crate::validate::is_valid_text;

type Strategy = fn(&Path, usize) -> Option<String>;

const STRATEGIES: &[Strategy] = &[layout_text, page_text, content_stream_text];

pub fn extract(path: &Path, config: &ExtractionConfig) -> Option<String> {
    for strategy in STRATEGIES {
        if let Some(text) = strategy(path, config.max_pdf_pages) {
            let text = text.trim().to_string();
            if !text.is_empty() && is_valid_text(&text) {
                return Some(text);
            }
        }
    }
    None
}

/// Strategy 1: pdf-extract's layout-aware reconstruction.
fn layout_text(path: &Path, _max_pages: usize) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    pdf_extract::extract_text_from_mem(&bytes).ok()
}

/// Strategy 2: lopdf's per-page text extraction.
fn page_text(path: &Path, max_pages: usize) -> Option<String> {
    let doc = Document::load(path).ok()?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().take(max_pages).collect();
    if page_numbers.is_empty() {
        return None;
    }
    doc.extract_text(&page_numbers).ok()
}

/// Strategy 3: scan content streams for text-showing operator operands.
///
/// Ignores font encodings entirely; strings are decoded as lossy UTF-8.
/// The validator downstream decides whether the result is usable.
fn content_stream_text(path: &Path, max_pages: usize) -> Option<String> {
    let doc = Document::load(path).ok()?;
    let mut parts: Vec<String> = Vec::new();

    for (_number, page_id) in doc.get_pages().into_iter().take(max_pages) {
        let Ok(data) = doc.get_page_content(page_id) else {
            continue;
        };
        let Ok(content) = Content::decode(&data) else {
            continue;
        };
        for operation in &content.operations {
            match operation.operator.as_str() {
                "Tj" | "'" | "\"" => {
                    for operand in &operation.operands {
                        push_string_operand(operand, &mut parts);
                    }
                }
                "TJ" => {
                    for operand in &operation.operands {
                        if let Object::Array(elements) = operand {
                            for element in elements {
                                push_string_operand(element, &mut parts);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn push_string_operand(object: &Object, parts: &mut Vec<String>) {
    if let Object::String(bytes, _) = object {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pdf_is_none() {
        let tmp = std::env::temp_dir().join("dsg-bad.pdf");
        std::fs::write(&tmp, b"not a pdf at all").unwrap();
        let config = ExtractionConfig::default();
        assert!(extract(&tmp, &config).is_none());
        let _ = std::fs::remove_file(&tmp);
    }

    #[test]
    fn empty_file_is_none() {
        let tmp = std::env::temp_dir().join("dsg-empty.pdf");
        std::fs::write(&tmp, b"").unwrap();
        let config = ExtractionConfig::default();
        assert!(extract(&tmp, &config).is_none());
        let _ = std::fs::remove_file(&tmp);
    }
}
