//! Whitespace normalization applied before encoding.
//!
//! Determinism is defined over the normalized form: two issues whose text
//! differs only in whitespace encode to identical vectors.

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_gap = false;
    for c in text.chars() {
        if c.is_whitespace() {
            in_gap = true;
        } else {
            if in_gap && !out.is_empty() {
                out.push(' ');
            }
            in_gap = false;
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_interior_runs() {
        assert_eq!(
            normalize_whitespace("crash  on\t\tsave\n\nplease help"),
            "crash on save please help"
        );
    }

    #[test]
    fn trims_leading_and_trailing() {
        assert_eq!(normalize_whitespace("  padded  "), "padded");
    }

    #[test]
    fn all_whitespace_becomes_empty() {
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn already_normal_text_is_unchanged() {
        assert_eq!(normalize_whitespace("plain text"), "plain text");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalization_is_idempotent(s in ".{0,200}") {
                let once = normalize_whitespace(&s);
                prop_assert_eq!(normalize_whitespace(&once), once);
            }

            #[test]
            fn output_never_has_adjacent_spaces(s in ".{0,200}") {
                let out = normalize_whitespace(&s);
                prop_assert!(!out.contains("  "));
                prop_assert!(!out.starts_with(' '));
                prop_assert!(!out.ends_with(' '));
            }
        }
    }
}
