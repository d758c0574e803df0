//! Heuristic text recovery for legacy `.doc` binaries.
//!
//! The Word 97 binary format is not parsed structurally. Instead three
//! best-effort passes run over the raw bytes and their yields are merged:
//!
//! 1. printable-ASCII runs of at least 4 bytes;
//! 2. a whole-file UTF-16LE decode, split on newlines;
//! 3. a structured-storage (OLE) stream walk, each stream decoded as UTF-8
//!    and, when that yields nothing usable, UTF-16LE.
//!
//! Tokens are filtered (length, letter content, punctuation-only),
//! deduplicated case-insensitively, and capped. Recovery is lossy by
//! design; callers must not assume completeness.

use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::config::ExtractionConfig;

/// At most this many ASCII runs are considered (pass 1).
const MAX_ASCII_RUNS: usize = 200;

/// Per-stream read cap for the OLE walk.
const MAX_STREAM_BYTES: u64 = 4 * 1024 * 1024;

static ASCII_RUN: Lazy<regex::bytes::Regex> =
    Lazy::new(|| regex::bytes::Regex::new(r"[\x20-\x7E]{4,}").expect("ASCII run pattern is valid"));

pub fn extract(path: &Path, config: &ExtractionConfig) -> Option<String> {
    let content = std::fs::read(path).ok()?;
    let mut candidates: Vec<String> = Vec::new();

    collect_ascii_runs(&content, &mut candidates);
    collect_utf16_lines(&content, &mut candidates);
    collect_ole_streams(path, &mut candidates);

    let mut seen: Vec<String> = Vec::new();
    let mut kept: Vec<String> = Vec::new();
    for candidate in candidates {
        let token = candidate.trim();
        if !keep_token(token) {
            continue;
        }
        let lower = token.to_lowercase();
        if seen.contains(&lower) {
            continue;
        }
        seen.push(lower);
        kept.push(token.to_string());
        if kept.len() >= config.max_doc_tokens {
            break;
        }
    }

    if kept.is_empty() {
        None
    } else {
        Some(kept.join("\n"))
    }
}

/// Token filter shared by all passes: 3–500 characters, at least one
/// letter, not punctuation-only.
fn keep_token(token: &str) -> bool {
    let len = token.chars().count();
    if !(3..=500).contains(&len) {
        return false;
    }
    if !token.chars().any(char::is_alphabetic) {
        return false;
    }
    !token
        .chars()
        .all(|c| ".,;:!?-_=+()[]{}|/\\".contains(c))
}

fn collect_ascii_runs(content: &[u8], out: &mut Vec<String>) {
    for run in ASCII_RUN.find_iter(content).take(MAX_ASCII_RUNS) {
        // Runs are pure printable ASCII, so the conversion cannot fail.
        let Ok(text) = std::str::from_utf8(run.as_bytes()) else {
            continue;
        };
        let text = text.trim();
        let digits_only = text.chars().filter(|c| *c != ' ').all(|c| c.is_ascii_digit());
        if !digits_only {
            out.push(text.to_string());
        }
    }
}

fn collect_utf16_lines(content: &[u8], out: &mut Vec<String>) {
    let units: Vec<u16> = content
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let decoded = String::from_utf16_lossy(&units);
    for line in decoded.split('\n') {
        let line = line.trim();
        if !line.is_empty() {
            out.push(line.to_string());
        }
    }
}

fn collect_ole_streams(path: &Path, out: &mut Vec<String>) {
    let Ok(mut compound) = cfb::open(path) else {
        return;
    };
    let stream_paths: Vec<std::path::PathBuf> = compound
        .walk()
        .filter(|entry| entry.is_stream())
        .map(|entry| entry.path().to_path_buf())
        .collect();

    for stream_path in stream_paths {
        let Ok(stream) = compound.open_stream(&stream_path) else {
            continue;
        };
        let mut bytes = Vec::new();
        if stream.take(MAX_STREAM_BYTES).read_to_end(&mut bytes).is_err() {
            continue;
        }

        let utf8_lines = usable_lines(&String::from_utf8_lossy(&bytes));
        if !utf8_lines.is_empty() {
            out.extend(utf8_lines);
            continue;
        }

        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        out.extend(usable_lines(&String::from_utf16_lossy(&units)));
    }
}

fn usable_lines(decoded: &str) -> Vec<String> {
    decoded
        .split('\n')
        .map(str::trim)
        .filter(|line| keep_token(line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_ascii_runs_from_binary() {
        let mut content = vec![0u8; 64];
        content.extend_from_slice(b"Quarterly accounting report");
        content.extend(vec![0xFFu8; 32]);
        content.extend_from_slice(b"Human resources summary");
        let tmp = std::env::temp_dir().join("dsg-runs.doc");
        std::fs::write(&tmp, &content).unwrap();

        let text = extract(&tmp, &ExtractionConfig::default()).unwrap();
        assert!(text.contains("Quarterly accounting report"));
        assert!(text.contains("Human resources summary"));
        let _ = std::fs::remove_file(&tmp);
    }

    #[test]
    fn deduplicates_case_insensitively() {
        let mut content = Vec::new();
        content.extend_from_slice(b"Contract Terms\x00\x00");
        content.extend_from_slice(b"CONTRACT TERMS\x00\x00");
        let tmp = std::env::temp_dir().join("dsg-dedup.doc");
        std::fs::write(&tmp, &content).unwrap();

        let text = extract(&tmp, &ExtractionConfig::default()).unwrap();
        assert_eq!(text.to_lowercase().matches("contract terms").count(), 1);
        let _ = std::fs::remove_file(&tmp);
    }

    #[test]
    fn all_noise_is_none() {
        let tmp = std::env::temp_dir().join("dsg-noise.doc");
        std::fs::write(&tmp, vec![0u8; 256]).unwrap();
        assert!(extract(&tmp, &ExtractionConfig::default()).is_none());
        let _ = std::fs::remove_file(&tmp);
    }

    #[test]
    fn token_filter_rules() {
        assert!(keep_token("báo cáo"));
        assert!(!keep_token("ab"));
        assert!(!keep_token("12345"));
        assert!(!keep_token("---...---"));
        let long = "a".repeat(501);
        assert!(!keep_token(&long));
    }
}
