//! Sync run bookkeeping.
//!
//! Each deck moves through `Pending → InProgress → Done | Failed` and carries
//! the counts the run report shows. Recovered problems (malformed rows,
//! missing media, rejected notes) are counted here instead of being raised.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::anki::ApiError;
use crate::media::MediaStats;
use crate::model::DeckPathError;

/// Direction of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    /// Application → repository.
    Export,
    /// Repository → application.
    Import,
}

impl std::fmt::Display for SyncKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Export => write!(f, "export"),
            Self::Import => write!(f, "import"),
        }
    }
}

/// Processing state of one deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckState {
    Pending,
    InProgress,
    Done,
    Failed,
}

/// Which decks an export covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSelection {
    /// Every deck the application lists.
    All,
    /// The named decks, in the given order.
    Named(Vec<String>),
}

/// Which tabular files an import covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    /// Every tabular file below the decks directory.
    All,
    /// Explicit files or directories. Directories are searched recursively.
    Paths(Vec<PathBuf>),
}

/// Outcome and counts for one deck.
#[derive(Debug, Clone, Serialize)]
pub struct DeckReport {
    /// Deck name as known to the application.
    pub deck: String,
    /// Tabular file read or written.
    pub file: Option<PathBuf>,
    pub state: DeckState,
    /// Notes written (export) or added (import).
    pub notes: usize,
    /// Notes the application refused, duplicates included.
    pub notes_rejected: usize,
    /// Notes dropped because both sides were empty.
    pub notes_skipped: usize,
    /// Rows dropped for having fewer than two columns or bad encoding.
    pub rows_malformed: usize,
    pub media: MediaStats,
    /// Why the deck failed.
    pub error: Option<String>,
}

impl DeckReport {
    #[must_use]
    pub fn new(deck: impl Into<String>) -> Self {
        Self {
            deck: deck.into(),
            file: None,
            state: DeckState::Pending,
            notes: 0,
            notes_rejected: 0,
            notes_skipped: 0,
            rows_malformed: 0,
            media: MediaStats::default(),
            error: None,
        }
    }

    /// `Pending → InProgress`.
    pub fn begin(&mut self) {
        debug_assert_eq!(self.state, DeckState::Pending);
        self.state = DeckState::InProgress;
    }

    /// `InProgress → Done`.
    pub fn complete(&mut self) {
        debug_assert_eq!(self.state, DeckState::InProgress);
        self.state = DeckState::Done;
    }

    /// Any state `→ Failed`, keeping the counts gathered so far.
    pub fn fail(&mut self, error: &SyncError) {
        self.state = DeckState::Failed;
        self.error = Some(error.to_string());
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state == DeckState::Failed
    }
}

/// Aggregate counts over every deck of a run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Totals {
    pub decks_done: usize,
    pub decks_failed: usize,
    pub notes: usize,
    pub notes_rejected: usize,
    pub notes_skipped: usize,
    pub rows_malformed: usize,
    pub media: MediaStats,
}

impl Totals {
    fn add(&mut self, deck: &DeckReport) {
        match deck.state {
            DeckState::Done => self.decks_done += 1,
            DeckState::Failed => self.decks_failed += 1,
            DeckState::Pending | DeckState::InProgress => {}
        }
        self.notes += deck.notes;
        self.notes_rejected += deck.notes_rejected;
        self.notes_skipped += deck.notes_skipped;
        self.rows_malformed += deck.rows_malformed;
        self.media.absorb(&deck.media);
    }
}

/// Everything a run did, deck by deck.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub kind: SyncKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub decks: Vec<DeckReport>,
    pub totals: Totals,
}

impl RunReport {
    #[must_use]
    pub fn new(kind: SyncKind) -> Self {
        Self {
            kind,
            started_at: Utc::now(),
            finished_at: None,
            decks: Vec::new(),
            totals: Totals::default(),
        }
    }

    /// Record a finished deck.
    pub fn push(&mut self, deck: DeckReport) {
        self.totals.add(&deck);
        self.decks.push(deck);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when no deck failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.totals.decks_failed == 0
    }
}

/// Sync-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO error on a tabular file or media folder.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular format error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Application call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Deck name is not a valid deck path.
    #[error("invalid deck name: {0}")]
    InvalidDeck(#[from] DeckPathError),

    /// Deck name slugifies to nothing.
    #[error("deck {deck:?} has no file system identity")]
    NoIdentity {
        /// The offending deck name.
        deck: String,
    },

    /// File name does not map back to a deck.
    #[error("cannot infer a deck name from {0}")]
    UnknownFile(PathBuf),

    /// Requested deck does not exist in the application.
    #[error("deck {0:?} does not exist in the application")]
    UnknownDeck(String),

    /// Configured note template does not exist.
    #[error("note template {0:?} does not exist")]
    UnknownModel(String),

    /// Note template cannot hold a front and a back.
    #[error("note template {model:?} has {fields} field(s), at least 2 are needed")]
    InvalidTemplate {
        /// Template name.
        model: String,
        /// Number of fields it has.
        fields: usize,
    },

    /// The application offers no note template at all.
    #[error("the application has no note template")]
    NoTemplate,
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
