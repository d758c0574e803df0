//! Deterministic keyword fallback matcher.
//!
//! The substitute suggestion path when extraction yields nothing or the
//! model is unavailable: scan the extracted text (or, failing that, the
//! document's display name) for configured domain keywords, and suggest
//! every unit whose name or code contains a triggered keyword. Pure,
//! network-free, and shaped exactly like a model-path result so callers
//! never branch on which path produced it.

use crate::models::{SuggestionResult, Unit, MAX_SUGGESTIONS};

/// Produce a fallback suggestion for `document_name` / `document_text`
/// against `units`, using the configured `keywords` vocabulary.
///
/// Deterministic: identical inputs always produce identical id ordering
/// (keyword order first, then unit order).
pub fn suggest_fallback(
    document_name: &str,
    document_text: Option<&str>,
    units: &[Unit],
    keywords: &[String],
) -> SuggestionResult {
    if units.is_empty() {
        return SuggestionResult::none(0, 1, true);
    }

    let search_text = match document_text {
        Some(text) if !text.trim().is_empty() => text.to_lowercase(),
        _ => document_name.to_lowercase(),
    };

    let mut suggested_ids: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.to_lowercase();
        if keyword.is_empty() || !search_text.contains(&keyword) {
            continue;
        }
        for unit in units {
            if suggested_ids.contains(&unit.id) {
                continue;
            }
            if unit.name.to_lowercase().contains(&keyword)
                || unit.code.to_lowercase().contains(&keyword)
            {
                suggested_ids.push(unit.id.clone());
            }
        }
    }
    suggested_ids.truncate(MAX_SUGGESTIONS);

    if suggested_ids.is_empty() {
        return SuggestionResult::none(0, 1, true);
    }

    SuggestionResult {
        has_suggestions: true,
        suggested_ids,
        message: String::new(),
        is_fallback: true,
        chunk_index: 0,
        total_chunks: 1,
        is_final: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FallbackConfig;

    fn unit(id: &str, name: &str, code: &str) -> Unit {
        Unit {
            id: id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    fn default_keywords() -> Vec<String> {
        FallbackConfig::default().keywords
    }

    #[test]
    fn matches_keyword_in_document_name_against_unit_name() {
        let units = vec![
            unit("u1", "Phòng Hành chính", "HC"),
            unit("u2", "Phòng Kế toán", "KT"),
        ];
        let result = suggest_fallback(
            "Báo cáo kế toán tháng 10",
            None,
            &units,
            &default_keywords(),
        );
        assert!(result.is_fallback);
        assert!(result.is_final);
        assert_eq!(result.chunk_index, 0);
        assert_eq!(result.suggested_ids, vec!["u2"]);
        assert!(result.has_suggestions);
    }

    #[test]
    fn extracted_text_takes_precedence_over_name() {
        let units = vec![
            unit("u1", "Phòng Kế toán", "KT"),
            unit("u2", "Phòng Nhân sự", "NS"),
        ];
        // Name mentions accounting, content mentions HR; content wins.
        let result = suggest_fallback(
            "kế toán",
            Some("Danh sách nhân sự mới tuyển dụng"),
            &units,
            &default_keywords(),
        );
        assert_eq!(result.suggested_ids, vec!["u2"]);
    }

    #[test]
    fn matches_on_unit_code() {
        let units = vec![unit("u1", "Phòng Tổng hợp", "kế toán-01")];
        let result = suggest_fallback("hồ sơ kế toán", None, &units, &default_keywords());
        assert_eq!(result.suggested_ids, vec!["u1"]);
    }

    #[test]
    fn no_keyword_match_is_no_suggestions_with_fallback_flag() {
        let units = vec![unit("u1", "Phòng Kỹ thuật", "KTh")];
        let result = suggest_fallback("untitled scan", None, &units, &default_keywords());
        assert!(result.is_fallback);
        assert!(!result.has_suggestions);
        assert!(result.suggested_ids.is_empty());
        assert_eq!(result.message, crate::models::NO_MATCH_MESSAGE);
    }

    #[test]
    fn deduplicates_and_caps_at_five() {
        let units: Vec<Unit> = (0..8)
            .map(|i| unit(&format!("u{}", i), &format!("Phòng Kế toán {}", i), "KT"))
            .collect();
        let result = suggest_fallback(
            "báo cáo kế toán và tài chính",
            None,
            &units,
            &default_keywords(),
        );
        assert_eq!(result.suggested_ids.len(), MAX_SUGGESTIONS);
        let mut deduped = result.suggested_ids.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn deterministic_ordering() {
        let units = vec![
            unit("u1", "Phòng Tài chính", "TC"),
            unit("u2", "Phòng Kế toán", "KT"),
            unit("u3", "Phòng Nhân sự", "NS"),
        ];
        let a = suggest_fallback(
            "báo cáo tài chính kế toán nhân sự",
            None,
            &units,
            &default_keywords(),
        );
        let b = suggest_fallback(
            "báo cáo tài chính kế toán nhân sự",
            None,
            &units,
            &default_keywords(),
        );
        assert_eq!(a.suggested_ids, b.suggested_ids);
    }

    #[test]
    fn empty_units_is_terminal_none() {
        let result = suggest_fallback("anything", None, &[], &default_keywords());
        assert!(result.is_fallback);
        assert!(!result.has_suggestions);
    }
}
