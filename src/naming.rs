//! Name classification
//!
//! Generic-name detection, single-letter screening against a configurable
//! exception list, a three-level quality grade, and per-module naming
//! convention votes with a strict-majority rule.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Names that communicate nothing about intent.
pub const GENERIC_NAMES: &[&str] = &[
    "data", "info", "temp", "tmp", "obj", "object", "item", "items", "stuff", "thing", "things",
    "val", "value", "values", "var", "vars", "foo", "bar", "baz", "qux", "res", "ret", "retval",
    "misc", "do_stuff", "do_thing", "dostuff", "process_data", "handle_data", "my_func",
    "my_function", "myfunc", "func", "fn1", "method", "aux",
];

const NAME_VALUE_GOOD: f64 = 1.0;
const NAME_VALUE_ACCEPTABLE: f64 = 0.6;
const NAME_VALUE_POOR: f64 = 0.0;

/// Shortest name that can grade as good. Shorter names cap at acceptable
/// even when multi-word.
pub const GOOD_NAME_MIN_LEN: usize = 6;

static LETTER_DIGITS: OnceLock<Regex> = OnceLock::new();

fn letter_digits() -> &'static Regex {
    LETTER_DIGITS.get_or_init(|| Regex::new(r"^[A-Za-z]\d+$").unwrap())
}

/// True for names from the closed generic list, or a single letter
/// followed only by digits (`x1`, `a22`).
pub fn is_generic_name(name: &str) -> bool {
    GENERIC_NAMES.contains(&name.to_lowercase().as_str()) || letter_digits().is_match(name)
}

/// True for a one-letter name outside the exception list.
pub fn is_single_letter(name: &str, exceptions: &[String]) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            !exceptions.iter().any(|e| e.eq_ignore_ascii_case(name))
        }
        _ => false,
    }
}

/// Three-level grade for a single name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameQuality {
    Poor,
    Acceptable,
    Good,
}

impl NameQuality {
    /// Contribution to the naming metric, in `0.0..=1.0`.
    pub fn value(self) -> f64 {
        match self {
            NameQuality::Good => NAME_VALUE_GOOD,
            NameQuality::Acceptable => NAME_VALUE_ACCEPTABLE,
            NameQuality::Poor => NAME_VALUE_POOR,
        }
    }
}

/// Word segments in a name: separator-delimited parts plus case humps.
/// `parse_config` and `userRepository` both count 2.
fn word_segment_count(name: &str) -> usize {
    let mut segments = 0usize;
    let mut in_word = false;
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c == '_' || c == '-' {
            in_word = false;
            prev = Some(c);
            continue;
        }
        let hump = c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
        if !in_word || hump {
            segments += 1;
        }
        in_word = true;
        prev = Some(c);
    }
    segments
}

/// Grade a name. Generic names and disallowed single letters are poor;
/// descriptive means multi-word and at least [`GOOD_NAME_MIN_LEN`] chars;
/// everything in between is acceptable.
pub fn classify_name_quality(name: &str, exceptions: &[String]) -> NameQuality {
    if is_generic_name(name) || is_single_letter(name, exceptions) {
        return NameQuality::Poor;
    }
    if word_segment_count(name) >= 2 && name.chars().count() >= GOOD_NAME_MIN_LEN {
        return NameQuality::Good;
    }
    NameQuality::Acceptable
}

/// Mean quality value over a set of names. `None` when no names.
pub fn average_name_quality<'a>(
    names: impl IntoIterator<Item = &'a str>,
    exceptions: &[String],
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;
    for name in names {
        sum += classify_name_quality(name, exceptions).value();
        count += 1;
    }
    (count > 0).then(|| sum / f64::from(count))
}

/// Naming convention a set of declarations follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    Snake,
    Camel,
    Pascal,
    Kebab,
    ScreamingSnake,
    /// No strict majority among the classifiable names.
    Mixed,
}

impl NamingConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingConvention::Snake => "snake_case",
            NamingConvention::Camel => "camelCase",
            NamingConvention::Pascal => "PascalCase",
            NamingConvention::Kebab => "kebab-case",
            NamingConvention::ScreamingSnake => "SCREAMING_SNAKE_CASE",
            NamingConvention::Mixed => "mixed",
        }
    }
}

/// Classify one name's convention. Names with no case signal (a single
/// lowercase token) do not vote.
pub fn classify_convention(name: &str) -> Option<NamingConvention> {
    let has_underscore = name.contains('_');
    let has_hyphen = name.contains('-');
    let letters: Vec<char> = name.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return None;
    }
    let any_upper = letters.iter().any(|c| c.is_ascii_uppercase());
    let any_lower = letters.iter().any(|c| c.is_ascii_lowercase());
    let first_upper = letters.first().is_some_and(|c| c.is_ascii_uppercase());

    if has_hyphen {
        return if !has_underscore && !any_upper {
            Some(NamingConvention::Kebab)
        } else {
            Some(NamingConvention::Mixed)
        };
    }

    match (has_underscore, any_upper, any_lower) {
        (true, false, true) => Some(NamingConvention::Snake),
        (true, true, false) => Some(NamingConvention::ScreamingSnake),
        (true, true, true) => Some(NamingConvention::Mixed),
        (false, true, true) if first_upper => Some(NamingConvention::Pascal),
        (false, true, true) => Some(NamingConvention::Camel),
        (false, true, false) if letters.len() > 1 => Some(NamingConvention::ScreamingSnake),
        // A single lowercase token or lone capital carries no signal.
        _ => None,
    }
}

/// Detect the dominant convention by strict majority vote. Anything short
/// of a strict majority, including an empty vote, is [`NamingConvention::Mixed`].
pub fn detect_naming_convention<'a>(names: impl IntoIterator<Item = &'a str>) -> NamingConvention {
    let mut votes: BTreeMap<NamingConvention, usize> = BTreeMap::new();
    let mut total = 0usize;
    for name in names {
        if let Some(convention) = classify_convention(name) {
            *votes.entry(convention).or_insert(0) += 1;
            total += 1;
        }
    }

    votes
        .into_iter()
        .find(|&(_, count)| count * 2 > total)
        .map(|(convention, _)| convention)
        .unwrap_or(NamingConvention::Mixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exceptions() -> Vec<String> {
        crate::config::DEFAULT_NAMING_EXCEPTIONS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_generic_names() {
        assert!(is_generic_name("data"));
        assert!(is_generic_name("Data"));
        assert!(is_generic_name("tmp"));
        assert!(is_generic_name("foo"));
        assert!(is_generic_name("x1"));
        assert!(is_generic_name("a22"));
        assert!(!is_generic_name("parse_config"));
        assert!(!is_generic_name("userRepository"));
    }

    #[test]
    fn test_single_letter_respects_exceptions() {
        let ex = exceptions();
        assert!(!is_single_letter("i", &ex));
        assert!(!is_single_letter("x", &ex));
        assert!(is_single_letter("q", &ex));
        assert!(is_single_letter("w", &ex));
        assert!(!is_single_letter("qq", &ex));
        assert!(!is_single_letter("7", &ex));
    }

    #[test]
    fn test_classify_name_quality() {
        let ex = exceptions();
        assert_eq!(classify_name_quality("data", &ex), NameQuality::Poor);
        assert_eq!(classify_name_quality("q", &ex), NameQuality::Poor);
        assert_eq!(classify_name_quality("i", &ex), NameQuality::Acceptable);
        assert_eq!(classify_name_quality("ok", &ex), NameQuality::Acceptable);
        assert_eq!(classify_name_quality("ctx", &ex), NameQuality::Acceptable);
        assert_eq!(classify_name_quality("cfg", &ex), NameQuality::Acceptable);
        // Single-word names are never more than acceptable.
        assert_eq!(classify_name_quality("calculate", &ex), NameQuality::Acceptable);
        // Multi-word but too short.
        assert_eq!(classify_name_quality("do_it", &ex), NameQuality::Acceptable);
        assert_eq!(
            classify_name_quality("build_dependency_graph", &ex),
            NameQuality::Good
        );
        assert_eq!(classify_name_quality("userRepository", &ex), NameQuality::Good);
        assert_eq!(classify_name_quality("GetUser", &ex), NameQuality::Good);
    }

    #[test]
    fn test_name_quality_values() {
        assert_eq!(NameQuality::Good.value(), 1.0);
        assert_eq!(NameQuality::Poor.value(), 0.0);
        assert!(NameQuality::Acceptable.value() > 0.0);
        assert!(NameQuality::Acceptable.value() < 1.0);
    }

    #[test]
    fn test_classify_convention() {
        assert_eq!(classify_convention("get_user"), Some(NamingConvention::Snake));
        assert_eq!(classify_convention("getUser"), Some(NamingConvention::Camel));
        assert_eq!(classify_convention("GetUser"), Some(NamingConvention::Pascal));
        assert_eq!(
            classify_convention("MAX_RETRIES"),
            Some(NamingConvention::ScreamingSnake)
        );
        assert_eq!(classify_convention("main"), None);
        assert_eq!(classify_convention("x"), None);
        assert_eq!(classify_convention("get_User"), Some(NamingConvention::Mixed));
        assert_eq!(classify_convention("get-user"), Some(NamingConvention::Kebab));
        assert_eq!(classify_convention("get-User"), Some(NamingConvention::Mixed));
    }

    #[test]
    fn test_majority_vote_camel() {
        let convention = detect_naming_convention(["getUser", "getOrder", "get_item"]);
        assert_eq!(convention, NamingConvention::Camel);
    }

    #[test]
    fn test_no_strict_majority_is_mixed() {
        let convention = detect_naming_convention(["getUser", "get_item"]);
        assert_eq!(convention, NamingConvention::Mixed);
        assert_eq!(detect_naming_convention([]), NamingConvention::Mixed);
    }

    #[test]
    fn test_unclassifiable_names_do_not_vote() {
        // "main" has no signal; the two snake votes are 2/2.
        let convention = detect_naming_convention(["main", "get_user", "load_config"]);
        assert_eq!(convention, NamingConvention::Snake);
    }

    #[test]
    fn test_average_name_quality() {
        let ex = exceptions();
        let avg = average_name_quality(["data", "parse_config"], &ex);
        assert_eq!(avg, Some(0.5));
        assert_eq!(average_name_quality([], &ex), None);
    }
}
