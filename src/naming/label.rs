use regex::Regex;

/// Reduce a registry label to the text that should drive the identifier.
///
/// Drops "defined in" trailers, bracketed asides, and anything after the
/// first `:` or `;`.
pub(super) fn clean_label(raw: &str) -> String {
    let defined_in =
        Regex::new(r"[.,].* defined in .*").expect("regex for defined-in trailers");
    let wrapped = is_fully_wrapped(raw);
    let mut text = defined_in.replace(raw, "").into_owned();

    // Wrapping is judged on the raw label; the trimmed text loses its ends either way.
    if wrapped {
        text = strip_outer_chars(&text);
    }

    let parens = Regex::new(r"\(.*?\)").expect("regex for parenthesized asides");
    let brackets = Regex::new(r"\[.*?\]").expect("regex for bracketed asides");
    let text = parens.replace_all(&text, "");
    let text = brackets.replace_all(&text, "");
    let text: String = text
        .chars()
        .map(|ch| match ch {
            '(' | ')' | '[' | ']' => ' ',
            other => other,
        })
        .collect();

    let text = text.trim();
    let text = text.split(':').next().unwrap_or_default().trim();
    let text = text.split(';').next().unwrap_or_default().trim();
    text.replace(|ch: char| ch == '_' || ch == '-', " ")
}

fn is_fully_wrapped(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 2 {
        return false;
    }
    matches!(
        (bytes[0], bytes[bytes.len() - 1]),
        (b'[', b']') | (b'(', b')')
    )
}

fn strip_outer_chars(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// Split cleaned text into ASCII alphanumeric tokens; `+` spells out as `PLUS`.
pub(super) fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            current.push(ch);
        } else if ch == '+' {
            current.push_str("PLUS");
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defined_in_trailer_is_removed() {
        assert_eq!(
            clean_label(
                "A confidentiality clearance. The key value pairs of the map are defined in ADatP-4774.4"
            ),
            "A confidentiality clearance"
        );
    }

    #[test]
    fn outer_brackets_are_unwrapped_before_asides_are_removed() {
        assert_eq!(
            clean_label("[COSE algorithm identifier, Base Hash value]"),
            "COSE algorithm identifier, Base Hash value"
        );
        assert_eq!(clean_label("(bare) thing [RFC1]"), "thing");
    }

    #[test]
    fn wrapping_is_judged_before_the_defined_in_trailer_is_removed() {
        assert_eq!(clean_label("[A] b, as defined in [C]"), "A");
    }

    #[test]
    fn stray_brackets_and_trailing_clauses_are_dropped() {
        assert_eq!(clean_label("Set (unordered: see x"), "Set  unordered");
        assert_eq!(
            clean_label("Standard date/time string; see Section 3.4.1"),
            "Standard date/time string"
        );
        assert_eq!(clean_label("multi_word-label"), "multi word label");
    }

    #[test]
    fn tokenize_splits_on_punctuation_and_spells_plus() {
        assert_eq!(
            tokenize("C++ date/time, v2.0"),
            vec!["CPLUSPLUS", "date", "time", "v2", "0"]
        );
        assert!(tokenize("  ¿¡ ").is_empty());
    }
}
