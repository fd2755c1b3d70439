//! Text normalization for file names and media folders.
//!
//! A slug is the ASCII, lower-case, underscore-separated form of a label:
//! `"C'est l'été"` becomes `"cest_lete"`. Slugs name the subject folders,
//! the tabular files and the media subfolders of the repository.

use unicode_normalization::UnicodeNormalization;

/// Normalize `text` into a slug.
///
/// Accented characters are decomposed and reduced to their ASCII base,
/// anything else outside ASCII is dropped. Only word characters,
/// whitespace and hyphens survive, the result is trimmed and lower-cased,
/// and every run of whitespace or hyphens collapses into one underscore.
///
/// Total and idempotent. Input made only of punctuation yields an empty
/// string, which callers treat as "no identity".
#[must_use]
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || is_separator(*c))
        .collect();

    let lowered = kept.trim_matches(is_space).to_ascii_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for c in lowered.chars() {
        if is_separator(c) {
            if !in_separator {
                slug.push('_');
                in_separator = true;
            }
        } else {
            slug.push(c);
            in_separator = false;
        }
    }

    slug
}

/// ASCII whitespace, vertical tab and the information separators included.
fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || matches!(c, '\x0b' | '\x1c'..='\x1f')
}

fn is_separator(c: char) -> bool {
    c == '-' || is_space(c)
}
