//! Heuristic sanity filter for extracted text.
//!
//! PDF extraction can "succeed" on a scanned or corrupt file by decoding
//! compressed streams into garbage. [`is_valid_text`] rejects such output
//! before it reaches the model: too short, too few letters, too many
//! non-printable or control characters, or a long run of characters outside
//! the expected alphabet. It gates only the PDF strategies; word-processor
//! and spreadsheet text is trusted as-is.

use once_cell::sync::Lazy;
use regex::Regex;

/// The accented Vietnamese alphabet, lower and upper case.
///
/// `char::is_alphabetic` already covers these for the letter-density check;
/// the explicit list is needed for the garbage-run character class below.
const VIETNAMESE_CHARS: &str = "àáảãạăằắẳẵặâầấẩẫậèéẻẽẹêềếểễệìíỉĩịòóỏõọôồốổỗộơờớởỡợùúủũụưừứửữựỳýỷỹỵđ\
ÀÁẢÃẠĂẰẮẲẴẶÂẦẤẨẪẬÈÉẺẼẸÊỀẾỂỄỆÌÍỈĨỊÒÓỎÕỌÔỒỐỔỖỘƠỜỚỞỠỢÙÚỦŨỤƯỪỨỬỮỰỲÝỶỸỴĐ";

/// ≥20 consecutive characters outside the allowed alphanumeric /
/// Vietnamese / whitespace / punctuation set.
static GARBAGE_RUN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"[^a-zA-Z0-9{}\s.,;:!?\-_=+()\[\]{{}}|/\\]{{20,}}",
        VIETNAMESE_CHARS
    );
    Regex::new(&pattern).expect("garbage-run pattern is valid")
});

fn is_control_outside_whitespace(c: char) -> bool {
    (c as u32) < 32 && !matches!(c, '\n' | '\r' | '\t')
}

/// Returns `true` when `text` looks like genuinely extracted prose.
pub fn is_valid_text(text: &str) -> bool {
    let text = text.trim();
    let total = text.chars().count();
    if total < 10 {
        return false;
    }

    let mut letters = 0usize;
    let mut invalid = 0usize;
    let mut control = 0usize;
    for c in text.chars() {
        if c.is_control() && !matches!(c, '\n' | '\r' | '\t') {
            invalid += 1;
        } else if c.is_alphabetic() {
            letters += 1;
        }
        if is_control_outside_whitespace(c) {
            control += 1;
        }
    }

    if invalid * 10 > total {
        return false;
    }
    if letters * 5 < total {
        return false;
    }
    if control * 20 > total {
        return false;
    }

    !GARBAGE_RUN.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_prose() {
        assert!(is_valid_text(
            "Quarterly financial report for the accounting department."
        ));
    }

    #[test]
    fn accepts_vietnamese_prose() {
        assert!(is_valid_text(
            "Báo cáo tài chính quý 3 của Phòng Kế toán, trình Ban Giám đốc phê duyệt."
        ));
    }

    #[test]
    fn rejects_short_text() {
        assert!(!is_valid_text("abc"));
        assert!(!is_valid_text("   trimmed   "));
        assert!(!is_valid_text(""));
    }

    #[test]
    fn rejects_binary_garbage() {
        let garbage: String = "\u{0001}\u{0002}\u{0003}\u{0004}".repeat(20);
        assert!(!is_valid_text(&garbage));
    }

    #[test]
    fn rejects_low_letter_density() {
        let digits = "0123456789 ".repeat(10);
        assert!(!is_valid_text(&digits));
    }

    #[test]
    fn rejects_long_symbol_run() {
        let text = format!("A normal looking sentence here {}", "§".repeat(25));
        assert!(!is_valid_text(&text));
    }

    #[test]
    fn tolerates_whitespace_controls() {
        let text = "Line one\r\nLine two\tindented\nLine three with words";
        assert!(is_valid_text(text));
    }
}
