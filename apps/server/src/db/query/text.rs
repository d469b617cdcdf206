//! Search-term folding and LIKE escaping.

use unicode_normalization::UnicodeNormalization;

/// Separator placed between folded fields in the stored search column.
///
/// Removed from field values on write, so it only ever marks a field boundary.
/// A term containing it would match across two fields and is treated as
/// matching nothing (see [`spans_fields`]).
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// Fold text for case-insensitive comparison.
///
/// Composes to NFC first so precomposed and decomposed accents compare equal,
/// then applies full Unicode lower-casing (`É` -> `é`, not ASCII-only).
pub fn fold_for_search(input: &str) -> String {
    input.nfc().collect::<String>().to_lowercase()
}

/// True when a folded term contains the field separator.
pub fn spans_fields(folded: &str) -> bool {
    folded.contains(FIELD_SEPARATOR)
}

/// Fold several fields into one searchable string.
pub fn fold_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(FIELD_SEPARATOR);
        }
        out.extend(fold_for_search(field).chars().filter(|c| *c != FIELD_SEPARATOR));
    }
    out
}

/// Escape SQL LIKE meta-characters so user input is treated literally.
pub fn escape_like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// True when the trimmed term is a non-empty run of ASCII digits.
pub fn is_code_prefix(term: &str) -> bool {
    !term.is_empty() && term.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_lowercases_beyond_ascii() {
        assert_eq!(fold_for_search("MODERNO"), "moderno");
        assert_eq!(fold_for_search("ODONTOLÓGICO"), "odontológico");
        assert_eq!(fold_for_search("AÇÃO"), "ação");
    }

    #[test]
    fn fold_composes_decomposed_accents() {
        let decomposed = "CLI\u{0301}NICA";
        assert_eq!(fold_for_search(decomposed), "clínica");
        assert_eq!(fold_for_search(decomposed), fold_for_search("CLÍNICA"));
    }

    #[test]
    fn fold_keeps_whitespace_and_control_characters() {
        assert_eq!(fold_for_search(" Basico\n"), " basico\n");
        assert!(!spans_fields("a\tb"));
        assert!(spans_fields("a\u{1f}b"));
    }

    #[test]
    fn fold_fields_joins_with_separator() {
        assert_eq!(fold_fields(["AB", "Cd"]), "ab\u{1f}cd");
        assert_eq!(fold_fields(["A\u{1f}B", "c"]), "ab\u{1f}c");
        assert_eq!(fold_fields(Vec::<&str>::new()), "");
    }

    #[test]
    fn escape_like_pattern_escapes_meta_characters() {
        assert_eq!(escape_like_pattern("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }

    #[test]
    fn code_prefix_requires_ascii_digits() {
        assert!(is_code_prefix("456"));
        assert!(!is_code_prefix(""));
        assert!(!is_code_prefix("45a"));
        assert!(!is_code_prefix("４５"));
    }
}
