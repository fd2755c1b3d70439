//! The automation interface the sync pipeline drives.
//!
//! Every call is a single synchronous request/response against the running
//! application. [`AnkiConnectClient`](super::AnkiConnectClient) implements it
//! over HTTP; tests use an in-memory double.

use super::types::{AppNote, NewNote};

/// Errors surfaced by the automation interface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The endpoint could not be reached at all.
    #[error("cannot reach {0}")]
    Unreachable(String),

    /// The application answered with an error description.
    #[error("application error: {0}")]
    Remote(String),

    /// The answer could not be understood.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// Result type for automation calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Operations consumed from the flashcard application.
pub trait AnkiApi {
    /// Protocol version of the automation add-on. Used as a reachability probe.
    fn version(&self) -> ApiResult<u32>;

    /// Names of every deck, nested decks included.
    fn deck_names(&self) -> ApiResult<Vec<String>>;

    /// IDs of the notes with at least one card in `deck` itself, child decks
    /// excluded.
    fn find_notes(&self, deck: &str) -> ApiResult<Vec<u64>>;

    /// Fields and tags of the given notes.
    fn notes_info(&self, ids: &[u64]) -> ApiResult<Vec<AppNote>>;

    /// Create `name`. Creating an existing deck is a no-op.
    fn create_deck(&self, name: &str) -> ApiResult<()>;

    /// Submit notes. The result has one entry per submitted note: the new
    /// note ID, or `None` if the application rejected it (duplicates
    /// included).
    fn add_notes(&self, notes: &[NewNote]) -> ApiResult<Vec<Option<u64>>>;

    /// Names of the available note templates.
    fn model_names(&self) -> ApiResult<Vec<String>>;

    /// Field names of a note template, in order.
    fn model_field_names(&self, model: &str) -> ApiResult<Vec<String>>;

    /// Store an asset under `filename`, replacing any asset of that name.
    fn store_media_file(&self, filename: &str, data: &[u8]) -> ApiResult<()>;
}
