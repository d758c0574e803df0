//! Legacy XLS extraction via calamine.
//!
//! Same shape as the XLSX path: up to `max_sheets` sheets, `max_sheet_rows`
//! rows each, non-empty cell values joined with spaces, sheet name prefix.
//! Date cells are rendered `D/M/Y`.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xls};
use chrono::Datelike;

use crate::config::ExtractionConfig;

pub fn extract(path: &Path, config: &ExtractionConfig) -> Option<String> {
    let mut workbook: Xls<_> = open_workbook(path).ok()?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut lines: Vec<String> = Vec::new();
    for name in sheet_names.into_iter().take(config.max_sheets) {
        let Ok(range) = workbook.worksheet_range(&name) else {
            continue;
        };
        lines.push(format!("Sheet: {}", name));
        for row in range.rows().take(config.max_sheet_rows) {
            let values: Vec<String> = row.iter().filter_map(cell_text).collect();
            if !values.is_empty() {
                lines.push(values.join(" "));
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_number(*f)),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| format!("{}/{}/{}", d.day(), d.month(), d.year())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
