//! Deck synchronization between the repository and the application.
//!
//! - **Export**: application decks → tabular files + media folders
//! - **Import**: tabular files + media folders → application decks
//! - **Codec**: the `;`-delimited note row format
//! - **Status**: listings of both sides
//!
//! # Architecture
//!
//! ```text
//! export:  app notes ──▶ rewrite (→ repository) + pull media ──▶ encode ──▶ decks/<subject>/<file>.csv
//! import:  decks/…/<file>.csv ──▶ decode ──▶ push media + rewrite (→ storage) ──▶ addNotes
//! ```
//!
//! Decks are processed one at a time. Reaching the application and finding
//! a usable note template are checked once before any file is touched; past
//! that point every failure stays inside its deck, which ends `Failed`
//! while the run moves on.
//!
//! # Example
//!
//! ```ignore
//! use decksync::sync::{DeckSelection, Exporter, FileSelection, Importer};
//!
//! let report = Exporter::new(&client, &layout, &app_media_dir).export(&DeckSelection::All)?;
//! let report = Importer::new(&client, &layout, None).import(&FileSelection::All)?;
//! ```

pub mod codec;
mod export;
pub mod file;
mod import;
mod report;
mod status;
mod types;

pub use codec::{Decoded, Row, decode, encode, read_rows, write_rows};
pub use export::Exporter;
pub use file::{atomic_write, expand_paths, find_deck_files};
pub use import::{Importer, PREFERRED_MODEL, resolve_template};
pub use report::{print_report, render_report};
pub use status::{DeckEntry, FileEntry, list_decks, list_files, print_decks, print_files};
pub use types::{
    DeckReport, DeckSelection, DeckState, FileSelection, RunReport, SyncError, SyncKind,
    SyncResult, Totals,
};
