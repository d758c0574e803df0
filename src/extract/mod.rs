//! Multi-format text extraction for uploaded office documents.
//!
//! Turns a stored file path into a bounded plain-text string, or nothing.
//! Dispatch is by file extension, case-insensitive: PDF, DOCX, legacy DOC,
//! XLSX, and legacy XLS. Extraction never surfaces an error: missing
//! files, unsupported formats, unparsable binaries, and failed validation
//! all collapse to `None`, which callers treat as "no content" (the
//! expected outcome for scanned or image-only documents).
//!
//! Whatever a format module yields is truncated to
//! [`ExtractionConfig::max_chars`](crate::config::ExtractionConfig)
//! characters before being returned.

pub mod doc;
pub mod docx;
pub mod pdf;
pub mod xls;
pub mod xlsx;

use std::path::Path;

use crate::config::ExtractionConfig;

/// Extract plain text from the file at `path`, or `None` when the file is
/// missing, unsupported, or yields no usable text.
pub fn extract_text(path: &Path, config: &ExtractionConfig) -> Option<String> {
    if !path.is_file() {
        return None;
    }

    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let text = match ext.as_str() {
        "pdf" => pdf::extract(path, config),
        "docx" => docx::extract(path, config),
        "doc" => doc::extract(path, config),
        "xlsx" => xlsx::extract(path, config),
        "xls" => xls::extract(path, config),
        _ => None,
    }?;

    let text = truncate_chars(text.trim(), config.max_chars);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Truncate to at most `max` characters, respecting UTF-8 boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let config = ExtractionConfig::default();
        assert!(extract_text(Path::new("/nonexistent/report.pdf"), &config).is_none());
    }

    #[test]
    fn unknown_extension_is_none() {
        let config = ExtractionConfig::default();
        let tmp = std::env::temp_dir().join("dsg-extract-unknown.png");
        std::fs::write(&tmp, b"not a supported format").unwrap();
        assert!(extract_text(&tmp, &config).is_none());
        let _ = std::fs::remove_file(&tmp);
    }

    #[test]
    fn extensionless_file_is_none() {
        let config = ExtractionConfig::default();
        let tmp = std::env::temp_dir().join("dsg-extract-noext");
        std::fs::write(&tmp, b"plain bytes").unwrap();
        assert!(extract_text(&tmp, &config).is_none());
        let _ = std::fs::remove_file(&tmp);
    }

    #[test]
    fn truncation_counts_characters() {
        let text = "kế toán ".repeat(10);
        let truncated = truncate_chars(&text, 11);
        assert_eq!(truncated.chars().count(), 11);
        assert_eq!(truncated, "kế toán kế ");
    }

    #[test]
    fn truncation_is_noop_for_short_text() {
        assert_eq!(truncate_chars("short", 5000), "short");
    }
}
