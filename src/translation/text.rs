/*!
 * Text normalization and translation eligibility.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Digits with thousands separators, decimals, ranges or signs
static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\d\s,.\-]+$").expect("Invalid numeric pattern regex")
});

/// Collapse every whitespace run to one space and trim both ends.
/// Missing text cleans to an empty string.
pub fn clean(text: Option<&str>) -> String {
    match text {
        Some(text) => text.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

/// Whether `text` is worth sending for translation.
///
/// Text is skipped when, after cleaning, it is shorter than two characters,
/// is a formatted number such as `1,234.50` or `2024-01-31`, or starts with
/// `=` like a formula.
pub fn is_eligible(text: &str) -> bool {
    let cleaned = clean(Some(text));
    if cleaned.chars().count() < 2 {
        return false;
    }
    if NUMERIC_PATTERN.is_match(&cleaned) {
        return false;
    }
    !cleaned.starts_with('=')
}
