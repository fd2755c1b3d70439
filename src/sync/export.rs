//! Application → repository export.
//!
//! For every selected deck the exporter fetches its notes, copies the
//! referenced assets out of the application's flat media store into the
//! deck's media folder, rewrites the references into repository form and
//! writes the tabular file.
//!
//! # Snapshot Mode
//!
//! A deck file always reflects the current state of the deck: it is
//! rewritten whole, even when the deck is empty.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::anki::AnkiApi;
use crate::config::RepoLayout;
use crate::media::{Direction, extract_filenames, pull, rewrite};
use crate::model::{DeckPath, Note};
use crate::sync::codec::{encode, write_rows};
use crate::sync::types::{DeckReport, DeckSelection, RunReport, SyncError, SyncKind, SyncResult};

/// Exporter for deck files.
pub struct Exporter<'a> {
    api: &'a dyn AnkiApi,
    layout: &'a RepoLayout,
    app_media_dir: &'a Path,
}

impl<'a> Exporter<'a> {
    /// Create an exporter writing into `layout` and reading assets from the
    /// application store at `app_media_dir`.
    #[must_use]
    pub fn new(api: &'a dyn AnkiApi, layout: &'a RepoLayout, app_media_dir: &'a Path) -> Self {
        Self {
            api,
            layout,
            app_media_dir,
        }
    }

    /// Export the selected decks.
    ///
    /// Decks are processed one after the other; a failed deck is recorded
    /// and the next one proceeds.
    ///
    /// # Errors
    ///
    /// Returns an error before touching any file if the application cannot
    /// be reached or its deck list cannot be read.
    pub fn export(&self, selection: &DeckSelection) -> SyncResult<RunReport> {
        let version = self.api.version()?;
        info!(version, "Application reachable");

        let available = self.api.deck_names()?;
        let names = match selection {
            DeckSelection::All => available.clone(),
            DeckSelection::Named(names) => {
                let mut seen = HashSet::new();
                names
                    .iter()
                    .filter(|n| seen.insert(n.as_str()))
                    .cloned()
                    .collect()
            }
        };

        let mut report = RunReport::new(SyncKind::Export);
        for name in names {
            let mut deck = DeckReport::new(&name);
            deck.begin();
            info!(deck = %name, "Exporting deck");

            let result = if available.contains(&name) {
                self.export_deck(&name, &mut deck)
            } else {
                Err(SyncError::UnknownDeck(name.clone()))
            };

            match result {
                Ok(()) => deck.complete(),
                Err(e) => {
                    warn!(deck = %name, error = %e, "Deck export failed");
                    deck.fail(&e);
                }
            }
            report.push(deck);
        }

        report.finish();
        Ok(report)
    }

    fn export_deck(&self, name: &str, deck: &mut DeckReport) -> SyncResult<()> {
        let identity = DeckPath::parse(name)?.identity();
        if !identity.has_identity() {
            return Err(SyncError::NoIdentity {
                deck: name.to_string(),
            });
        }

        let file = self.layout.decks_dir.join(identity.relative_file());
        deck.file = Some(file.clone());

        let ids = self.api.find_notes(name)?;
        let app_notes = self.api.notes_info(&ids)?;

        let subfolder = identity.media_subfolder.as_str();
        let mut transferred = HashSet::new();
        let mut notes = Vec::with_capacity(app_notes.len());

        for app_note in &app_notes {
            let references = extract_filenames(app_note.front())
                .into_iter()
                .chain(extract_filenames(app_note.back()));
            for filename in references {
                // Names in stored HTML may be entity-encoded (`&amp;`)
                let filename = html_escape::decode_html_entities(&filename).into_owned();
                if transferred.insert(filename.clone()) {
                    let outcome =
                        pull(&filename, subfolder, self.app_media_dir, &self.layout.media_dir);
                    deck.media.record(&outcome);
                }
            }

            notes.push(
                Note::new(
                    rewrite(app_note.front(), subfolder, Direction::ToRepository),
                    rewrite(app_note.back(), subfolder, Direction::ToRepository),
                )
                .with_tags(&app_note.tags),
            );
        }

        let rows = encode(&notes);
        write_rows(&file, &rows)?;

        deck.notes = rows.len();
        deck.notes_skipped = notes.len() - rows.len();
        info!(
            deck = %name,
            notes = deck.notes,
            media = deck.media.transferred,
            missing = deck.media.missing,
            "Deck exported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anki::testing::FakeAnki;
    use crate::sync::codec::read_rows;
    use crate::sync::types::DeckState;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        layout: RepoLayout,
        app_media: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let layout = RepoLayout::new(dir.path().join("repo"));
        let app_media = dir.path().join("collection.media");
        fs::create_dir_all(&app_media).unwrap();
        Fixture {
            _dir: dir,
            layout,
            app_media,
        }
    }

    #[test]
    fn test_export_writes_file_and_media() {
        let f = fixture();
        fs::write(f.app_media.join("graph.png"), b"png").unwrap();
        let api = FakeAnki::new().with_deck(
            "PTSI::Maths::Intégrales",
            &[
                ("<img src=\"graph.png\">", "x &lt; 1; y", &["analyse"]),
                ("Q2", "<img src=\"graph.png\"><img src=\"gone.png\">", &[]),
            ],
        );

        let exporter = Exporter::new(&api, &f.layout, &f.app_media);
        let report = exporter
            .export(&DeckSelection::Named(vec!["PTSI::Maths::Intégrales".into()]))
            .unwrap();

        let deck = &report.decks[0];
        assert_eq!(deck.state, DeckState::Done);
        assert_eq!(deck.notes, 2);
        assert_eq!(deck.media.transferred, 1);
        assert_eq!(deck.media.missing, 1);

        let file = f.layout.decks_dir.join("ptsi/maths_integrales.csv");
        assert_eq!(deck.file.as_deref(), Some(file.as_path()));
        let rows = read_rows(&file).unwrap().rows;
        assert_eq!(
            rows[0],
            [
                "<img src=\"../media/integrales/graph.png\">",
                "x < 1; y",
                "analyse"
            ]
        );
        assert_eq!(
            fs::read(f.layout.media_dir.join("integrales/graph.png")).unwrap(),
            b"png"
        );
    }

    #[test]
    fn test_export_empty_deck_writes_empty_file() {
        let f = fixture();
        let api = FakeAnki::new().with_deck("Vocabulaire", &[]);

        let report = Exporter::new(&api, &f.layout, &f.app_media)
            .export(&DeckSelection::Named(vec!["Vocabulaire".into()]))
            .unwrap();

        assert_eq!(report.decks[0].state, DeckState::Done);
        let file = f.layout.decks_dir.join("divers/vocabulaire.csv");
        assert!(file.exists());
        assert!(read_rows(&file).unwrap().rows.is_empty());
    }

    #[test]
    fn test_export_all_isolates_failures() {
        let f = fixture();
        let api = FakeAnki::new()
            .with_deck("A", &[("Qa", "Aa", &[])])
            .with_deck("B", &[("Qb", "Ab", &[])])
            .with_deck("C", &[("Qc", "Ac", &[])])
            .failing_deck("B");

        let report = Exporter::new(&api, &f.layout, &f.app_media)
            .export(&DeckSelection::All)
            .unwrap();

        let states: Vec<_> = report
            .decks
            .iter()
            .map(|d| (d.deck.as_str(), d.state))
            .collect();
        assert!(states.contains(&("A", DeckState::Done)));
        assert!(states.contains(&("B", DeckState::Failed)));
        assert!(states.contains(&("C", DeckState::Done)));
        assert!(f.layout.decks_dir.join("divers/c.csv").exists());
        assert_eq!(report.totals.decks_failed, 1);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_export_unknown_and_unnamed_decks_fail() {
        let f = fixture();
        let api = FakeAnki::new().with_deck("!!!", &[("Q", "A", &[])]);

        let report = Exporter::new(&api, &f.layout, &f.app_media)
            .export(&DeckSelection::Named(vec![
                "Missing".into(),
                "!!!".into(),
                "Missing".into(),
            ]))
            .unwrap();

        assert_eq!(report.decks.len(), 2);
        assert!(report.decks.iter().all(DeckReport::is_failed));
        assert!(report.decks[0].error.as_deref().unwrap().contains("does not exist"));
        assert!(report.decks[1].error.as_deref().unwrap().contains("identity"));
    }

    #[test]
    fn test_export_unreachable_touches_nothing() {
        let f = fixture();
        let api = FakeAnki::unreachable();

        let result = Exporter::new(&api, &f.layout, &f.app_media).export(&DeckSelection::All);

        assert!(matches!(result, Err(SyncError::Api(_))));
        assert!(!f.layout.root.exists());
    }

    #[test]
    fn test_export_twice_keeps_media_unchanged() {
        let f = fixture();
        fs::write(f.app_media.join("a.png"), b"a").unwrap();
        let api = FakeAnki::new().with_deck("Deck", &[("<img src='a.png'>", "A", &[])]);
        let exporter = Exporter::new(&api, &f.layout, &f.app_media);

        exporter.export(&DeckSelection::All).unwrap();
        let second = exporter.export(&DeckSelection::All).unwrap();

        let deck = second.decks.iter().find(|d| d.deck == "Deck").unwrap();
        assert_eq!(deck.media.unchanged, 1);
        assert_eq!(deck.media.transferred, 0);
    }
}
