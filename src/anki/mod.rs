//! Access to the running flashcard application.
//!
//! The application is an external collaborator reached through the
//! AnkiConnect add-on:
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────┐      HTTP/JSON     ┌──────────┐
//! │ Exporter/Importer│ ───▶ │ dyn AnkiApi  │ ─────────────────▶ │ Anki app │
//! └──────────────────┘      └──────────────┘  localhost:8765    └──────────┘
//! ```
//!
//! The pipeline only sees the [`AnkiApi`] trait. Duplicate detection stays
//! with the application: notes are submitted with a [`NoteOptions`] policy
//! and the application reports which ones it accepted.

pub mod api;
pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{AnkiApi, ApiError, ApiResult};
pub use client::{AnkiConnectClient, DEFAULT_ENDPOINT};
pub use types::{AppNote, DuplicateScope, NewNote, NoteOptions, NoteTemplate};
