//! Detects placeholder markers that survived template population.

use std::sync::OnceLock;

use regex::Regex;

/// Markers recognised as unfilled:
/// `[Party Name]`, `{{effective_date}}`, `<<Amount>>` and blanks of 4+ underscores.
fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[[^\[\]\n]{1,80}\]|\{\{[^{}\n]{1,80}\}\}|<<[^<>\n]{1,80}>>|_{4,}")
            .expect("placeholder pattern is valid")
    })
}

/// Returns every unfilled placeholder in `contract`, de-duplicated,
/// in order of first appearance.
pub fn find_unfilled_placeholders(contract: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in placeholder_pattern().find_iter(contract) {
        let marker = normalize_marker(m.as_str());
        if is_section_reference(&marker) {
            continue;
        }
        if !found.contains(&marker) {
            found.push(marker);
        }
    }
    found
}

/// Collapses blank lines of any length into a single canonical marker.
fn normalize_marker(marker: &str) -> String {
    if marker.chars().all(|c| c == '_') {
        "____".to_string()
    } else {
        marker.to_string()
    }
}

/// `[1]`, `[a]`, `[iv]` are footnote or list references, not placeholders.
fn is_section_reference(marker: &str) -> bool {
    let Some(inner) = marker.strip_prefix('[').and_then(|m| m.strip_suffix(']')) else {
        return false;
    };
    let inner = inner.trim();
    inner.chars().all(|c| c.is_ascii_digit())
        || (inner.len() == 1 && inner.chars().all(|c| c.is_ascii_alphabetic()))
        || (!inner.is_empty() && inner.len() <= 4 && inner.chars().all(|c| "ivxlIVXL".contains(c)))
}
