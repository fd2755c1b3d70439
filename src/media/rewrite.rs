//! Media reference rewriting.
//!
//! Card HTML embeds assets through `src` attributes. The application stores
//! every asset flat, keyed by file name (`src="graph.png"`), while the
//! repository scopes them per deck (`src="../media/integrales/graph.png"`).
//! [`rewrite`] converts between the two forms; both directions are
//! idempotent and external URLs are never touched.
//!
//! Attribute values are taken literally. Entity decoding belongs to the
//! tabular codec and happens before rewriting on import, after it on export.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Relative prefix of repository-form references.
pub const MEDIA_PREFIX: &str = "../media";

/// `src="…"` or `src='…'` in any case, capturing the attribute name and
/// the value of whichever quote style matched.
static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?P<name>(?i:src))=(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .expect("src attribute pattern is valid")
});

/// Which path convention references are rewritten into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `name` → `../media/<subfolder>/name`
    ToRepository,
    /// `any/path/name` → `name`
    ToStorage,
}

/// An asset reference found in card text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Folder named by the reference itself (`../media/<subfolder>/name`).
    pub subfolder: Option<String>,
    /// Base name, the cross-system key of the asset.
    pub filename: String,
}

/// Rewrite every local `src` reference in `text` into `direction`'s form.
///
/// Toward the repository only bare names are rewritten, so references that
/// already carry a path are left alone. Toward storage every path is cut
/// down to its base name, so a second pass finds nothing to change.
#[must_use]
pub fn rewrite(text: &str, subfolder: &str, direction: Direction) -> String {
    SRC_ATTR
        .replace_all(text, |caps: &Captures<'_>| {
            let (value, quote) = attr_value(caps);
            if value.is_empty() || is_external(value) {
                return caps[0].to_string();
            }

            let name = &caps["name"];
            match direction {
                Direction::ToRepository if !has_path(value) => {
                    format!("{name}={quote}{}{quote}", repository_path(subfolder, value))
                }
                Direction::ToStorage if has_path(value) => {
                    format!("{name}={quote}{}{quote}", basename(value))
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Base names of every local `src` reference, in order, duplicates kept.
#[must_use]
pub fn extract_filenames(text: &str) -> Vec<String> {
    local_values(text).map(|v| basename(v).to_string()).collect()
}

/// Every local `src` reference with the subfolder its path names, if any.
#[must_use]
pub fn extract_references(text: &str) -> Vec<MediaRef> {
    local_values(text)
        .map(|value| MediaRef {
            subfolder: named_subfolder(value),
            filename: basename(value).to_string(),
        })
        .collect()
}

/// Repository-form path of `filename` inside `subfolder`.
#[must_use]
pub fn repository_path(subfolder: &str, filename: &str) -> String {
    if subfolder.is_empty() {
        format!("{MEDIA_PREFIX}/{filename}")
    } else {
        format!("{MEDIA_PREFIX}/{subfolder}/{filename}")
    }
}

/// Whether a `src` value points outside the media stores.
#[must_use]
pub fn is_external(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
}

fn local_values(text: &str) -> impl Iterator<Item = &str> {
    SRC_ATTR
        .captures_iter(text)
        .filter_map(|caps| caps.name("dq").or_else(|| caps.name("sq")))
        .map(|m| m.as_str())
        .filter(|v| !v.is_empty() && !is_external(v))
}

fn attr_value<'t>(caps: &Captures<'t>) -> (&'t str, char) {
    match (caps.name("dq"), caps.name("sq")) {
        (Some(m), _) => (m.as_str(), '"'),
        (None, Some(m)) => (m.as_str(), '\''),
        (None, None) => ("", '"'),
    }
}

fn has_path(value: &str) -> bool {
    value.contains('/')
}

fn basename(value: &str) -> &str {
    value.rsplit('/').next().unwrap_or(value)
}

/// Directory directly containing the file, unless it is the media root or a
/// relative step.
fn named_subfolder(value: &str) -> Option<String> {
    let mut parts = value.rsplit('/');
    parts.next()?;
    let dir = parts.next()?;
    match dir {
        "" | "." | ".." | "media" => None,
        name => Some(name.to_string()),
    }
}
