//! AUTOSAR naming conventions.
//!
//! - SHORT-NAME: starts with a letter, then letters, digits or `_`, at most
//!   [`MAX_SHORT_NAME_LEN`] characters.
//! - Tag names (categories): UPPERCASE-HYPHENATED, e.g. `AR-PACKAGE`, `L-4`.

/// Maximum SHORT-NAME length accepted by the AUTOSAR identifier type.
pub const MAX_SHORT_NAME_LEN: usize = 128;

/// Check a SHORT-NAME against the AUTOSAR identifier rules.
pub fn is_valid_short_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name.len() <= MAX_SHORT_NAME_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Rewrite a name so it satisfies [`is_valid_short_name`].
///
/// Invalid characters become `_`, a leading non-letter gets an `N` prefix,
/// and the result is cut to the maximum length. Valid names are returned
/// unchanged, so the rewrite is idempotent.
pub fn sanitize_short_name(name: &str) -> String {
    if is_valid_short_name(name) {
        return name.to_string();
    }
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.insert(0, 'N');
    }
    out.truncate(MAX_SHORT_NAME_LEN);
    out
}

/// Check a tag name is UPPERCASE-HYPHENATED.
pub fn is_valid_tag_name(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let first_ok = parts.next().is_some_and(|first| {
        first.starts_with(|c: char| c.is_ascii_uppercase())
            && first.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    });
    first_ok
        && parts.all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
}

/// Normalize a user-supplied category name to tag form.
///
/// `arPackage`, `ar-package` and `AR-PACKAGE` all become `AR-PACKAGE`.
pub fn normalize_tag_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.contains('-') || trimmed.contains('_') {
        return trimmed.replace('_', "-").to_ascii_uppercase();
    }
    if !trimmed.chars().any(|c| c.is_ascii_lowercase()) {
        return trimmed.to_string();
    }
    let mut out = String::with_capacity(trimmed.len() + 4);
    for (i, c) in trimmed.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('-');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}
