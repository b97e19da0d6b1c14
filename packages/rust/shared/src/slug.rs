//! URL slug formatting for device names.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Turn free text into an ASCII, lower-case, hyphen-joined slug.
///
/// Diacritics are removed (NFD + combining-mark strip), anything outside
/// `[a-z0-9]`, whitespace and `-` is dropped, and runs of whitespace or
/// hyphens collapse into a single `-`.
pub fn format_slug(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    folded
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Title-case each hyphen-delimited token of a slug, joined by spaces.
pub fn slug_to_title(slug: &str) -> String {
    slug.split('-')
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
