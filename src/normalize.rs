//! Name normalization.
//!
//! The normalized form is the comparison key used by every matching rule.
//! It is never shown to users; display strings keep their original casing.

/// Canonicalizes a name for comparison: lowercase, trimmed, internal
/// whitespace collapsed to single spaces.
///
/// # Examples
///
/// ```
/// use castlist::normalize::normalize;
///
/// assert_eq!(normalize("  Shinei\t NOUZEN "), "shinei nouzen");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Display form of a raw name: trimmed with internal whitespace collapsed,
/// original casing kept.
#[must_use]
pub fn display_form(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits an already normalized name into its parts.
///
/// Parts are separated by whitespace or hyphens and stripped of surrounding
/// punctuation (`"mr."` becomes `"mr"`). Empty parts are dropped.
pub fn name_parts(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| c.is_whitespace() || c == '-')
        .map(|p| p.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|p| !p.is_empty())
}
