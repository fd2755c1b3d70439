//! Repository and application listings.
//!
//! `list decks` shows the decks the application knows with the file each
//! one exports to; `list files` shows the tabular files of the repository
//! with the deck each one imports into.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use crate::anki::AnkiApi;
use crate::config::RepoLayout;
use crate::model::{DeckIdentity, DeckPath};
use crate::sync::codec::read_rows;
use crate::sync::file::{file_size, find_deck_files};
use crate::sync::types::SyncResult;

/// An application deck and where it maps in the repository.
#[derive(Debug, Clone, Serialize)]
pub struct DeckEntry {
    pub deck: String,
    /// `None` when the name cannot be stored (punctuation only, empty segment).
    pub identity: Option<DeckIdentity>,
    /// Whether the deck file already exists.
    pub exported: bool,
}

/// A repository file and the deck it imports into.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    /// Path relative to the decks directory.
    pub file: PathBuf,
    pub deck: Option<String>,
    pub size: u64,
    pub rows: usize,
}

/// List the application's decks with their repository identity.
///
/// # Errors
///
/// Returns an error if the application cannot be queried.
pub fn list_decks(api: &dyn AnkiApi, layout: &RepoLayout) -> SyncResult<Vec<DeckEntry>> {
    let mut names = api.deck_names()?;
    names.sort();

    Ok(names
        .into_iter()
        .map(|deck| {
            let identity = DeckPath::parse(&deck)
                .ok()
                .map(|p| p.identity())
                .filter(DeckIdentity::has_identity);
            let exported = identity
                .as_ref()
                .is_some_and(|i| layout.decks_dir.join(i.relative_file()).is_file());
            DeckEntry {
                deck,
                identity,
                exported,
            }
        })
        .collect())
}

/// List the repository's tabular files with their inferred deck.
///
/// # Errors
///
/// Returns an error if the decks directory cannot be walked.
pub fn list_files(layout: &RepoLayout) -> SyncResult<Vec<FileEntry>> {
    let files = find_deck_files(&layout.decks_dir)?;

    Ok(files
        .into_iter()
        .map(|path| {
            let deck = DeckPath::from_storage_file(&path, Some(&layout.decks_dir))
                .map(|p| p.to_string());
            let rows = read_rows(&path).map_or(0, |batch| batch.rows.len());
            FileEntry {
                file: relative_to(&path, &layout.decks_dir),
                deck,
                size: file_size(&path),
                rows,
            }
        })
        .collect())
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

/// Print application decks to stdout in a human-readable format.
pub fn print_decks(entries: &[DeckEntry]) {
    if entries.is_empty() {
        println!("{}", "No decks in the application.".dimmed());
        return;
    }

    println!("{}", "Application Decks:".blue().bold());
    for entry in entries {
        match &entry.identity {
            Some(identity) => {
                let marker = if entry.exported {
                    "✓".green()
                } else {
                    "·".dimmed()
                };
                println!(
                    "  {marker} {}  {} {}",
                    entry.deck,
                    "→".dimmed(),
                    identity.relative_file().display()
                );
            }
            None => println!(
                "  {} {}  {}",
                "✗".red(),
                entry.deck,
                "(no file name can be derived)".dimmed()
            ),
        }
    }
}

/// Print repository files to stdout in a human-readable format.
pub fn print_files(entries: &[FileEntry]) {
    if entries.is_empty() {
        println!("{}", "No deck files found.".dimmed());
        println!("{}", "Run 'decksync export' to create them.".dimmed());
        return;
    }

    println!("{}", "Deck Files:".blue().bold());
    for entry in entries {
        let deck = entry
            .deck
            .as_deref()
            .map_or_else(|| "?".red().to_string(), ToString::to_string);
        println!(
            "  {} ({}, {} rows)  {} {deck}",
            entry.file.display(),
            format_size(entry.size),
            entry.rows,
            "→".dimmed(),
        );
    }
}

/// Format a byte size as a human-readable string.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
