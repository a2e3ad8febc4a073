//! Canonical form of free-text product names.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Generic symbol rewrites, applied before anything else.
const SYMBOLS: &[(&str, &str)] = &[("&", "and"), ("+", "and"), ("-", " "), ("_", " ")];

/// Domain synonyms, applied in order to the cleaned string.
const SYNONYMS: &[(&str, &str)] = &[
    ("knightsbridge", "knights bridge"),
    ("nice bridge", "knights bridge"),
];

/// Lowercases, rewrites symbols and synonyms, drops punctuation and collapses
/// whitespace. Total and idempotent.
pub fn normalize(name: &str) -> String {
    let mut normalized = name.trim().to_lowercase();

    for (from, to) in SYMBOLS {
        normalized = normalized.replace(from, to);
    }

    let mut normalized = collapse(&NON_WORD.replace_all(&normalized, " "));

    for (from, to) in SYNONYMS {
        normalized = normalized.replace(from, to);
    }

    collapse(&normalized)
}

fn collapse(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("Nice Bridge Watch", "knights bridge watch")]
    #[case("  KNIGHTSBRIDGE   Jacket ", "knights bridge jacket")]
    #[case("Nice-Bridge Watch", "knights bridge watch")]
    #[case("Salt & Pepper + Co", "salt and pepper and co")]
    #[case("wool_blend/coat!!", "wool blend coat")]
    #[case("", "")]
    #[case("   ", "")]
    fn normalizes_known_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(input in "[a-zA-Z0-9 &+_.!/-]{0,48}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_around_synonyms(
            prefix in "[a-z &-]{0,8}",
            synonym in prop::sample::select(vec!["nice bridge", "Nice-Bridge", "knightsbridge", "KnightsBridge", "nice  bridge"]),
            suffix in "[a-z &-]{0,8}",
        ) {
            let input = format!("{}{}{}", prefix, synonym, suffix);
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn output_has_no_edge_or_double_spaces(input in "\\PC{0,32}") {
            let out = normalize(&input);
            prop_assert_eq!(out.trim(), out.as_str());
            prop_assert!(!out.contains("  "));
        }
    }
}
