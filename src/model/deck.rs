//! Deck paths and the identities derived from them.
//!
//! A deck is addressed by a hierarchical path such as
//! `PTSI::Maths::Intégrales`. Everything the repository needs to know about a
//! deck (the tabular file it lives in, the media folder its assets go to) is
//! recomputed from that path on every run and never stored.
//!
//! # Repository mapping
//!
//! | Deck path                 | File                            | Media folder          |
//! |---------------------------|---------------------------------|-----------------------|
//! | `Vocabulaire`             | `divers/vocabulaire.csv`        | `media/vocabulaire/`  |
//! | `PTSI::Maths::Intégrales` | `ptsi/maths_integrales.csv`     | `media/integrales/`   |
//!
//! Decks whose last segments slugify identically share a media folder.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::slug::slugify;

/// Separator joining deck path segments.
pub const SEPARATOR: &str = "::";

/// Subject folder for decks that have a single segment.
pub const DEFAULT_SUBJECT: &str = "divers";

/// Extension of the tabular deck files.
pub const DECK_FILE_EXTENSION: &str = "csv";

/// Reasons a deck name cannot be turned into a [`DeckPath`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckPathError {
    #[error("deck path has no segments")]
    Empty,

    #[error("deck path segment {index} is empty")]
    EmptySegment { index: usize },

    #[error("deck path segment {segment:?} contains the `::` separator")]
    ContainsSeparator { segment: String },
}

/// An ordered, non-empty sequence of non-empty deck name segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeckPath {
    segments: Vec<String>,
}

impl DeckPath {
    /// Build a path from its segments.
    ///
    /// # Errors
    ///
    /// Fails when there are no segments, a segment is empty, or a segment
    /// contains the `::` separator (which would break the round-trip).
    pub fn new<I, S>(segments: I) -> Result<Self, DeckPathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(DeckPathError::Empty);
        }
        for (index, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(DeckPathError::EmptySegment { index });
            }
            if segment.contains(SEPARATOR) {
                return Err(DeckPathError::ContainsSeparator {
                    segment: segment.clone(),
                });
            }
        }
        Ok(Self { segments })
    }

    /// Split a deck name on `::`.
    ///
    /// # Errors
    ///
    /// Fails on an empty name or an empty segment (`A::::B`).
    pub fn parse(name: &str) -> Result<Self, DeckPathError> {
        if name.is_empty() {
            return Err(DeckPathError::Empty);
        }
        Self::new(name.split(SEPARATOR))
    }

    /// Infer a deck path from a tabular file previously written to the
    /// repository.
    ///
    /// A hyphenated stem (`<subject>-<rest>.csv`) is split on its first
    /// hyphen. Otherwise the subject is the folder the file sits in below
    /// `decks_dir`, and the default `divers` bucket maps back to a
    /// single-segment deck. Underscores in the remainder become spaces.
    ///
    /// This is an approximation of the forward direction: slugs lose case
    /// and accents, and a hyphen that belonged to the title is read as the
    /// subject boundary.
    #[must_use]
    pub fn from_storage_file(file: &Path, decks_dir: Option<&Path>) -> Option<Self> {
        let stem = file.file_stem()?.to_str()?;

        let mut segments = Vec::with_capacity(2);
        let rest = if let Some((subject, rest)) = stem.split_once('-') {
            segments.push(subject.to_string());
            rest
        } else {
            if let Some(subject) = subject_folder(file, decks_dir) {
                if subject != DEFAULT_SUBJECT {
                    segments.push(subject);
                }
            }
            stem
        };

        let title = rest.replace('_', " ");
        if !title.is_empty() {
            segments.push(title);
        }
        segments.retain(|s| !s.is_empty());

        Self::new(segments).ok()
    }

    /// The path segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The innermost segment.
    #[must_use]
    pub fn last(&self) -> &str {
        // `new` guarantees at least one segment
        self.segments.last().map_or("", String::as_str)
    }

    /// Derive the identity of this path.
    #[must_use]
    pub fn identity(&self) -> DeckIdentity {
        derive(self)
    }
}

impl fmt::Display for DeckPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(SEPARATOR))
    }
}

impl FromStr for DeckPath {
    type Err = DeckPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The repository-facing names of a deck, derived from its [`DeckPath`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckIdentity {
    /// Canonical deck name, segments joined with `::`.
    pub title: String,
    /// Folder below `decks/` holding the file.
    pub subject: String,
    /// File stem of the tabular file.
    pub storage_filename: String,
    /// Folder below `media/` holding the deck's assets.
    pub media_subfolder: String,
}

impl DeckIdentity {
    /// Whether the derived names are usable on disk.
    ///
    /// Labels made only of punctuation or non-Latin script slugify to
    /// nothing; such decks have no repository identity.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.subject.is_empty() && !self.storage_filename.is_empty()
    }

    /// Path of the tabular file relative to the decks directory.
    #[must_use]
    pub fn relative_file(&self) -> PathBuf {
        PathBuf::from(&self.subject)
            .join(format!("{}.{DECK_FILE_EXTENSION}", self.storage_filename))
    }
}

/// Derive the identity of a deck path.
#[must_use]
pub fn derive(path: &DeckPath) -> DeckIdentity {
    let segments = path.segments();

    let (subject, storage_filename) = match segments {
        [single] => (DEFAULT_SUBJECT.to_string(), slugify(single)),
        [first, rest @ ..] => (
            slugify(first),
            rest.iter().map(|s| slugify(s)).collect::<Vec<_>>().join("_"),
        ),
        [] => (DEFAULT_SUBJECT.to_string(), String::new()),
    };

    DeckIdentity {
        title: path.to_string(),
        subject,
        storage_filename,
        media_subfolder: slugify(path.last()),
    }
}

/// Name of the folder directly below `decks_dir` that contains `file`.
fn subject_folder(file: &Path, decks_dir: Option<&Path>) -> Option<String> {
    let relative = file.strip_prefix(decks_dir?).ok()?;
    let mut components = relative.components();
    let first = components.next()?;
    // The file itself must sit below the subject folder
    components.next()?;
    match first {
        Component::Normal(name) => name.to_str().map(String::from),
        _ => None,
    }
}
