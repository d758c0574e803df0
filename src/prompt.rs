//! Prompt construction and model-reply parsing.
//!
//! The model never sees unit ids. It is shown an enumerated list of
//! `Index i: name (code)` lines and answers with a comma-separated list of
//! indices (the position in the caller's unit list) or the literal `NONE`.
//! Keeping the answer vocabulary to small integers makes the reply cheap to
//! produce and trivially checkable against the list length.

use crate::models::{Unit, MAX_SUGGESTIONS};

/// System instruction constraining the reply format.
pub const SYSTEM_INSTRUCTION: &str = "Reply with only the indices of the relevant units, \
comma-separated, at most 5 indices. If no unit is relevant, reply NONE. Do not add any \
other content.";

/// One `Index i: name (code)` line per candidate unit, in list order.
pub fn format_unit_list(units: &[Unit]) -> String {
    units
        .iter()
        .enumerate()
        .map(|(i, unit)| format!("Index {}: {} ({})", i, unit.name, unit.code))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The per-chunk user prompt: task statement, chunk content with its
/// position, and the enumerated unit list.
pub fn build_chunk_prompt(
    chunk: &str,
    chunk_index: usize,
    total_chunks: usize,
    unit_list: &str,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Select only the units relevant to the document content below. If none are \
relevant, reply NONE.\nReply with indices only, comma-separated, at most ",
    );
    prompt.push_str(&MAX_SUGGESTIONS.to_string());
    prompt.push_str(" indices, with no explanation.\n\n");
    prompt.push_str(&format!(
        "DOCUMENT CONTENT (part {}/{}):\n",
        chunk_index + 1,
        total_chunks
    ));
    prompt.push_str(chunk);
    prompt.push_str("\n\nUNIT LIST:\n");
    prompt.push_str(unit_list);
    prompt
}

/// Parse a model reply into in-range unit indices, in encounter order.
///
/// A reply containing `NONE` (or an empty reply) yields no indices.
/// Non-numeric tokens and indices outside `[0, unit_count)` are ignored;
/// a malformed reply is not an error, it simply contributes nothing.
pub fn parse_reply_indices(reply: &str, unit_count: usize) -> Vec<usize> {
    let normalized = reply.trim().to_uppercase();
    if normalized.is_empty() || normalized.contains("NONE") {
        return Vec::new();
    }

    normalized
        .split(',')
        .filter_map(|token| token.trim().parse::<usize>().ok())
        .filter(|idx| *idx < unit_count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, name: &str, code: &str) -> Unit {
        Unit {
            id: id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn unit_list_is_enumerated_in_order() {
        let units = vec![
            unit("u1", "Phòng Kế toán", "KT"),
            unit("u2", "Phòng Nhân sự", "NS"),
        ];
        let listing = format_unit_list(&units);
        assert_eq!(listing, "Index 0: Phòng Kế toán (KT)\nIndex 1: Phòng Nhân sự (NS)");
    }

    #[test]
    fn prompt_carries_chunk_position_and_units() {
        let prompt = build_chunk_prompt("nội dung tài liệu", 1, 3, "Index 0: A (a)");
        assert!(prompt.contains("part 2/3"));
        assert!(prompt.contains("nội dung tài liệu"));
        assert!(prompt.contains("Index 0: A (a)"));
        assert!(prompt.contains("NONE"));
    }

    #[test]
    fn plain_indices_parsed_in_order() {
        assert_eq!(parse_reply_indices("0,2", 4), vec![0, 2]);
        assert_eq!(parse_reply_indices(" 3 , 1 ", 4), vec![3, 1]);
    }

    #[test]
    fn none_reply_yields_nothing() {
        assert!(parse_reply_indices("NONE", 4).is_empty());
        assert!(parse_reply_indices("none", 4).is_empty());
        assert!(parse_reply_indices("", 4).is_empty());
    }

    #[test]
    fn out_of_range_and_junk_tokens_ignored() {
        assert_eq!(parse_reply_indices("0,9,banana,2", 3), vec![0, 2]);
        assert!(parse_reply_indices("7,8,9", 3).is_empty());
        assert!(parse_reply_indices("-1", 3).is_empty());
    }
}
