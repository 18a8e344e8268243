/// Canonicalizes a raw header-cell string for comparison: every character
/// outside `[a-zA-Z0-9.,]` is removed and the remainder is lower-cased.
///
/// The output is used only for matching and never persisted, so dots and
/// commas survive while spacing, punctuation, and casing differences do not.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == ',')
        .flat_map(|c| c.to_lowercase())
        .collect()
}
