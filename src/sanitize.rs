//! Identifier sanitization
//!
//! Turns an arbitrary string into a valid identifier:
//! - an empty input stays empty
//! - a leading character that is neither a letter nor `_` is dropped
//! - every later character that is not a letter, digit or `_` becomes `_`
//! - the output never starts with a digit, so the transform is idempotent
//!
//! A letter is any character in the `L*` general categories and a digit is a
//! decimal number (`Nd`). Other numerals (`²`, `½`, `Ⅷ`) and combining marks
//! are neither.

use unicode_general_category::{get_general_category, GeneralCategory};

fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

fn is_digit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
}

fn is_leading(c: char) -> bool {
    c == '_' || is_letter(c)
}

fn is_trailing(c: char) -> bool {
    c == '_' || is_letter(c) || is_digit(c)
}

/// Sanitize a field name
pub fn sanitize(input: &str) -> String {
    let mut chars = input.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut out = String::with_capacity(input.len());
    let dropped = !is_leading(first);
    if !dropped {
        out.push(first);
    }

    for (i, c) in chars.enumerate() {
        // After a drop the second input character leads the output.
        let valid = if dropped && i == 0 { is_leading(c) } else { is_trailing(c) };
        out.push(if valid { c } else { '_' });
    }
    out
}

/// Sanitize the name of a dataflow connection or port
///
/// Same algorithm as [`sanitize`]; callers must run externally supplied
/// names through it before using them as identifiers.
pub fn sanitize_connection_name(name: &str) -> String {
    sanitize(name)
}

/// Whether `name` is already in sanitized form
pub fn is_sanitized(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => true,
        Some(first) => is_leading(first) && chars.all(is_trailing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_identity() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_leading_invalid_char_is_dropped() {
        assert_eq!(sanitize("1abc"), "abc");
        assert_eq!(sanitize("-x"), "x");
        assert_eq!(sanitize("1"), "");
    }

    #[test]
    fn test_interior_invalid_char_is_replaced() {
        assert_eq!(sanitize("a b"), "a_b");
        assert_eq!(sanitize("created-at"), "created_at");
        assert_eq!(sanitize("a.b.c"), "a_b_c");
    }

    #[test]
    fn test_leading_underscore_is_kept() {
        assert_eq!(sanitize("_ok"), "_ok");
    }

    #[test]
    fn test_unicode_letters_are_kept() {
        assert_eq!(sanitize("été"), "été");
        assert_eq!(sanitize("名前 2"), "名前_2");
        assert_eq!(sanitize("ǅx"), "ǅx");
        assert_eq!(sanitize("a٣"), "a٣");
    }

    #[test]
    fn test_non_decimal_numerals_and_marks_are_replaced() {
        assert_eq!(sanitize("a²"), "a_");
        assert_eq!(sanitize("a½"), "a_");
        assert_eq!(sanitize("aⅧ"), "a_");
        assert_eq!(sanitize("x\u{947}"), "x_");
        assert_eq!(sanitize("a\u{301}b"), "a_b");
        assert_eq!(sanitize("Ⅷx"), "x");
    }

    #[test]
    fn test_digit_after_dropped_char_cannot_lead() {
        assert_eq!(sanitize("12ab"), "_ab");
        assert_eq!(sanitize("1 a"), "_a");
    }

    #[test]
    fn test_length_rule() {
        for input in ["abc", "a b", "_x", "1abc", "#$%", "9-9"] {
            let kept = is_leading(input.chars().next().unwrap());
            let expected = input.chars().count() - usize::from(!kept);
            assert_eq!(sanitize(input).chars().count(), expected, "{}", input);
        }
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "", "1abc", "a b", "_ok", "12ab", "--", "9 lives", "x.y-z", "ünïcödé",
            " leading space", "1_", "__", "a\u{301}b", "½x", "²3",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input {:?}", input);
            assert!(is_sanitized(&once), "input {:?}", input);
        }
    }

    #[test]
    fn test_connection_name_matches_field_sanitizing() {
        assert_eq!(sanitize_connection_name("MAIN output"), "MAIN_output");
        assert_eq!(sanitize_connection_name("1st"), "st");
    }
}
