//! Decksync - Two-way sync between a flashcard repository and Anki
//!
//! This crate provides the core functionality for the `decksync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Deck paths, identities and notes
//! - [`slug`] - File-name-safe slugs for deck segments
//! - [`media`] - Media references, rewriting and transfer
//! - [`anki`] - `AnkiConnect` API and HTTP client
//! - [`sync`] - Deck export/import and the tabular file codec
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod anki;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod model;
pub mod slug;
pub mod sync;

pub use error::{Error, Result};
