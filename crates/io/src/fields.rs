//! `Field Name: value` extraction from free-text descriptions.

/// First `field: value` occurrence in `text`, matched case-insensitively.
///
/// The value runs to end of line and is trimmed. An empty value counts as
/// absent, so callers can fall back to their defaults with `unwrap_or`.
pub fn extract(text: &str, field: &str) -> Option<String> {
    if field.is_empty() {
        return None;
    }
    // ASCII lowercasing keeps byte offsets, so positions index `text` too.
    let haystack = text.to_ascii_lowercase();
    let needle = field.to_ascii_lowercase();

    let value = haystack
        .match_indices(needle.as_str())
        .find_map(|(at, _)| value_after(&text[at + needle.len()..]))?
        .trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// The rest of the line after `[ \t]*:`, or `None` when no colon follows.
fn value_after(rest: &str) -> Option<&str> {
    let rest = rest.trim_start_matches([' ', '\t']).strip_prefix(':')?;
    rest.split(['\r', '\n']).next()
}

/// `extract` with a fallback.
pub fn extract_or(text: &str, field: &str, default: &str) -> String {
    extract(text, field).unwrap_or_else(|| default.to_string())
}
