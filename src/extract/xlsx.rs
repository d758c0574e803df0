//! XLSX extraction via ZIP + streaming XML, values only.
//!
//! Reads up to `max_sheets` worksheets and `max_sheet_rows` rows per sheet.
//! Each sheet's output is prefixed with `Sheet: {name}` (display names from
//! `xl/workbook.xml`, paired positionally with the numerically sorted
//! worksheet parts); each row becomes one line of space-joined non-empty
//! cell values. Shared strings, inline strings, and raw numeric values are
//! supported; formulas contribute their cached results.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::docx::read_zip_entry_bounded;
use crate::config::ExtractionConfig;

pub fn extract(path: &Path, config: &ExtractionConfig) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    let mut archive = zip::ZipArchive::new(file).ok()?;

    let shared_strings = read_zip_entry_bounded(&mut archive, "xl/sharedStrings.xml")
        .map(|xml| parse_shared_strings(&xml))
        .unwrap_or_default();
    let display_names = read_zip_entry_bounded(&mut archive, "xl/workbook.xml")
        .map(|xml| parse_sheet_names(&xml))
        .unwrap_or_default();
    let part_names = worksheet_part_names(&archive);

    let mut lines: Vec<String> = Vec::new();
    for (idx, part) in part_names.into_iter().take(config.max_sheets).enumerate() {
        let Some(xml) = read_zip_entry_bounded(&mut archive, &part) else {
            continue;
        };
        let name = display_names
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("Sheet{}", idx + 1));
        lines.push(format!("Sheet: {}", name));
        lines.extend(parse_sheet_rows(&xml, &shared_strings, config.max_sheet_rows));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Worksheet part names in workbook order (numeric sort of `sheetN.xml`).
fn worksheet_part_names<R: std::io::Read + std::io::Seek>(
    archive: &zip::ZipArchive<R>,
) -> Vec<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    names.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    names
}

/// Sheet display names from `xl/workbook.xml`, in declaration order.
fn parse_sheet_names(xml: &[u8]) -> Vec<String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut names = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    if let Ok(Some(attr)) = e.try_get_attribute("name") {
                        if let Ok(value) = attr.unescape_value() {
                            names.push(value.into_owned());
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    names
}

/// Shared-string table: one entry per `si`, rich-text runs concatenated.
fn parse_shared_strings(xml: &[u8]) -> Vec<String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"si" {
                    in_si = true;
                    current.clear();
                } else if in_si && e.local_name().as_ref() == b"t" {
                    if let Ok(Event::Text(te)) = reader.read_event_into(&mut buf) {
                        current.push_str(&te.unescape().unwrap_or_default());
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"si" {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    strings
}

/// Row lines for one worksheet, capped at `max_rows` rows.
fn parse_sheet_rows(xml: &[u8], shared_strings: &[String], max_rows: usize) -> Vec<String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut rows: Vec<String> = Vec::new();
    let mut row_values: Vec<String> = Vec::new();
    let mut rows_seen = 0usize;
    let mut cell_type: Vec<u8> = Vec::new();
    let mut in_value = false;
    let mut in_inline_text = false;

    loop {
        if rows_seen > max_rows {
            break;
        }
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    rows_seen += 1;
                    if rows_seen > max_rows {
                        break;
                    }
                    row_values.clear();
                }
                b"c" => {
                    cell_type = e
                        .try_get_attribute("t")
                        .ok()
                        .flatten()
                        .map(|attr| attr.value.into_owned())
                        .unwrap_or_default();
                }
                b"v" => in_value = true,
                // inline strings: <c t="inlineStr"><is><t>...</t></is></c>
                b"t" if cell_type == b"inlineStr" => in_inline_text = true,
                _ => {}
            },
            Ok(Event::Text(te)) if in_value || in_inline_text => {
                let raw = te.unescape().unwrap_or_default();
                let value = raw.trim();
                if !value.is_empty() {
                    if in_value && cell_type == b"s" {
                        if let Ok(idx) = value.parse::<usize>() {
                            if let Some(shared) = shared_strings.get(idx) {
                                if !shared.trim().is_empty() {
                                    row_values.push(shared.trim().to_string());
                                }
                            }
                        }
                    } else {
                        row_values.push(value.to_string());
                    }
                }
                in_value = false;
                in_inline_text = false;
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"row" => {
                    if !row_values.is_empty() {
                        rows.push(row_values.join(" "));
                    }
                    row_values.clear();
                }
                b"v" => in_value = false,
                b"t" => in_inline_text = false,
                b"c" => cell_type.clear(),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    // A truncated final row still counts.
    if !row_values.is_empty() {
        rows.push(row_values.join(" "));
    }
    rows
}
