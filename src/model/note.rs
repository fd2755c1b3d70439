//! Flashcard note model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A two-sided flashcard with its tags.
///
/// `front` and `back` hold rich text (HTML). Tags never contain whitespace:
/// whitespace is their separator once serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Note {
    /// Create an untagged note.
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Attach tags, splitting any entry that contains whitespace.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.tags.extend(parse_tags(tag.as_ref()));
        }
        self
    }

    /// A note with nothing on either side is not a card.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.front.trim().is_empty() && self.back.trim().is_empty()
    }

    /// Tags joined by single spaces.
    #[must_use]
    pub fn tags_field(&self) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    }
}

/// Split a serialized tag field on whitespace.
#[must_use]
pub fn parse_tags(field: &str) -> BTreeSet<String> {
    field.split_whitespace().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_note() {
        assert!(Note::new("", "").is_blank());
        assert!(Note::new("  ", "\n").is_blank());
        assert!(!Note::new("Q", "").is_blank());
        assert!(!Note::new("", "A").is_blank());
    }

    #[test]
    fn test_tags_field_round_trip() {
        let note = Note::new("Q", "A").with_tags(["tagB", "tagA"]);
        assert_eq!(note.tags_field(), "tagA tagB");
        assert_eq!(parse_tags(&note.tags_field()), note.tags);
    }

    #[test]
    fn test_with_tags_splits_whitespace() {
        let note = Note::new("Q", "A").with_tags(["one two", "  three "]);
        let tags: Vec<_> = note.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, ["one", "three", "two"]);
    }

    #[test]
    fn test_parse_tags_empty() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags("   ").is_empty());
    }
}
