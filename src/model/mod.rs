//! Data models for Decksync.
//!
//! - [`DeckPath`] / [`DeckIdentity`]: hierarchical deck names and the
//!   repository names derived from them
//! - [`Note`]: a front/back flashcard with tags

pub mod deck;
pub mod note;

pub use deck::{derive, DeckIdentity, DeckPath, DeckPathError, DEFAULT_SUBJECT, SEPARATOR};
pub use note::{parse_tags, Note};
