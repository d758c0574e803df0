//! DOCX extraction via ZIP + streaming XML.
//!
//! Reads `word/document.xml` and collects up to `max_docx_paragraphs` body
//! paragraphs followed by every table row (cells space-joined). Word
//! documents carry trusted text, so no validator gate is applied.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::config::ExtractionConfig;

/// Decompressed entry read cap (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

pub fn extract(path: &Path, config: &ExtractionConfig) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    let mut archive = zip::ZipArchive::new(file).ok()?;
    let xml = read_zip_entry_bounded(&mut archive, "word/document.xml")?;
    let (paragraphs, table_rows) = collect_document_text(&xml, config.max_docx_paragraphs)?;

    let mut lines = paragraphs;
    lines.extend(table_rows);
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

pub(crate) fn read_zip_entry_bounded<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Option<Vec<u8>> {
    let entry = archive.by_name(name).ok()?;
    let mut out = Vec::new();
    entry.take(MAX_XML_ENTRY_BYTES).read_to_end(&mut out).ok()?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return None;
    }
    Some(out)
}

/// Walk `word/document.xml`, separating body paragraphs from table rows.
///
/// Body paragraphs (those outside any `w:tbl`) are capped; tables are
/// collected in full, one line per row with cell texts space-joined.
fn collect_document_text(xml: &[u8], max_paragraphs: usize) -> Option<(Vec<String>, Vec<String>)> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut table_rows: Vec<String> = Vec::new();

    let mut table_depth = 0usize;
    let mut paragraph = String::new();
    let mut cell = String::new();
    let mut row_cells: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" if table_depth == 0 => paragraph.clear(),
                b"tr" if table_depth > 0 => row_cells.clear(),
                b"tc" if table_depth > 0 => cell.clear(),
                b"t" => {
                    if let Ok(Event::Text(te)) = reader.read_event_into(&mut buf) {
                        let text = te.unescape().unwrap_or_default();
                        if table_depth > 0 {
                            cell.push_str(&text);
                        } else {
                            paragraph.push_str(&text);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" if table_depth == 0 => {
                    if !paragraph.trim().is_empty() && paragraphs.len() < max_paragraphs {
                        paragraphs.push(paragraph.trim().to_string());
                    }
                    paragraph.clear();
                }
                b"tc" if table_depth > 0 => {
                    if !cell.trim().is_empty() {
                        row_cells.push(cell.trim().to_string());
                    }
                    cell.clear();
                }
                b"tr" if table_depth > 0 => {
                    if !row_cells.is_empty() {
                        table_rows.push(row_cells.join(" "));
                    }
                    row_cells.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }

    Some((paragraphs, table_rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn document_xml(body: &str) -> Vec<u8> {
        format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"{}\"><w:body>{}</w:body></w:document>",
            DOC_NS, body
        )
        .into_bytes()
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    #[test]
    fn paragraphs_and_tables_collected_in_order() {
        let body = format!(
            "{}{}<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            para("First paragraph"),
            para("Second paragraph"),
            para("Cell A"),
            para("Cell B"),
        );
        let xml = document_xml(&body);
        let (paragraphs, rows) = collect_document_text(&xml, 100).unwrap();
        assert_eq!(paragraphs, vec!["First paragraph", "Second paragraph"]);
        assert_eq!(rows, vec!["Cell A Cell B"]);
    }

    #[test]
    fn paragraph_cap_applies_to_body_only() {
        let body: String = (0..10).map(|i| para(&format!("p{}", i))).collect();
        let xml = document_xml(&body);
        let (paragraphs, _) = collect_document_text(&xml, 3).unwrap();
        assert_eq!(paragraphs, vec!["p0", "p1", "p2"]);
    }

    #[test]
    fn empty_paragraphs_skipped() {
        let body = format!("{}<w:p/>{}", para("kept"), para("  "));
        let xml = document_xml(&body);
        let (paragraphs, _) = collect_document_text(&xml, 100).unwrap();
        assert_eq!(paragraphs, vec!["kept"]);
    }

    #[test]
    fn not_a_zip_is_none() {
        let tmp = std::env::temp_dir().join("dsg-bad.docx");
        std::fs::write(&tmp, b"not a zip archive").unwrap();
        let config = ExtractionConfig::default();
        assert!(extract(&tmp, &config).is_none());
        let _ = std::fs::remove_file(&tmp);
    }
}
