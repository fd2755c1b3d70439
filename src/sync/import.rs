//! Repository → application import.
//!
//! Each tabular file is decoded, its assets are uploaded, references are
//! rewritten into storage form and the notes are submitted to the deck the
//! file name maps back to.
//!
//! # Duplicate Handling
//!
//! Duplicate detection is left to the application: every note carries the
//! configured [`NoteOptions`] and whatever the application refuses is
//! counted as rejected. Importing an unchanged file twice therefore adds
//! nothing the second time.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::anki::{AnkiApi, NoteOptions, NoteTemplate};
use crate::config::RepoLayout;
use crate::media::{Direction, extract_references, push, rewrite};
use crate::model::DeckPath;
use crate::sync::codec::{decode, read_rows};
use crate::sync::file::{expand_paths, find_deck_files};
use crate::sync::types::{
    DeckReport, FileSelection, RunReport, SyncError, SyncKind, SyncResult,
};

/// Template name preferred when none is configured.
pub const PREFERRED_MODEL: &str = "Basic";

/// Importer for deck files.
pub struct Importer<'a> {
    api: &'a dyn AnkiApi,
    layout: &'a RepoLayout,
    model: Option<&'a str>,
    options: NoteOptions,
}

impl<'a> Importer<'a> {
    /// Create an importer reading from `layout`.
    ///
    /// `model` names the note template to use; `None` selects one.
    #[must_use]
    pub fn new(api: &'a dyn AnkiApi, layout: &'a RepoLayout, model: Option<&'a str>) -> Self {
        Self {
            api,
            layout,
            model,
            options: NoteOptions::default(),
        }
    }

    /// Override the duplicate policy sent with every note.
    #[must_use]
    pub fn with_options(mut self, options: NoteOptions) -> Self {
        self.options = options;
        self
    }

    /// Import the selected files.
    ///
    /// # Errors
    ///
    /// Returns an error before reading any file if the application cannot
    /// be reached or offers no usable note template, or if the decks
    /// directory cannot be listed.
    pub fn import(&self, selection: &FileSelection) -> SyncResult<RunReport> {
        let version = self.api.version()?;
        info!(version, "Application reachable");

        let template = resolve_template(self.api, self.model)?;
        info!(model = %template.name, "Using note template");

        let files = match selection {
            FileSelection::All => find_deck_files(&self.layout.decks_dir)?,
            FileSelection::Paths(paths) => expand_paths(paths)?,
        };
        let mut existing: HashSet<String> = self.api.deck_names()?.into_iter().collect();

        let mut report = RunReport::new(SyncKind::Import);
        for file in files {
            let deck_path = DeckPath::from_storage_file(&file, Some(&self.layout.decks_dir));
            let mut deck = DeckReport::new(
                deck_path
                    .as_ref()
                    .map_or_else(|| file.display().to_string(), ToString::to_string),
            );
            deck.file = Some(file.clone());
            deck.begin();
            info!(deck = %deck.deck, file = %file.display(), "Importing deck");

            let result = match &deck_path {
                Some(path) => self.import_file(&file, path, &template, &mut existing, &mut deck),
                None => Err(SyncError::UnknownFile(file.clone())),
            };

            match result {
                Ok(()) => deck.complete(),
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Deck import failed");
                    deck.fail(&e);
                }
            }
            report.push(deck);
        }

        report.finish();
        Ok(report)
    }

    fn import_file(
        &self,
        file: &Path,
        path: &DeckPath,
        template: &NoteTemplate,
        existing: &mut HashSet<String>,
        deck: &mut DeckReport,
    ) -> SyncResult<()> {
        let batch = read_rows(file)?;
        let decoded = decode(&batch.rows);
        deck.rows_malformed = batch.unreadable + decoded.malformed;
        deck.notes_skipped = decoded.blank;
        if deck.rows_malformed > 0 {
            warn!(file = %file.display(), rows = deck.rows_malformed, "Skipped malformed rows");
        }

        let deck_name = path.to_string();
        if !existing.contains(&deck_name) {
            self.api.create_deck(&deck_name)?;
            info!(deck = %deck_name, "Created deck");
            existing.insert(deck_name.clone());
        }

        let subfolder = path.identity().media_subfolder;
        let mut uploaded = HashSet::new();
        let mut notes = Vec::with_capacity(decoded.notes.len());

        for note in decoded.notes {
            let references = extract_references(&note.front)
                .into_iter()
                .chain(extract_references(&note.back));
            for reference in references {
                if !uploaded.insert(reference.filename.clone()) {
                    continue;
                }
                let mut candidates = Vec::with_capacity(2);
                if let Some(named) = reference.subfolder.as_deref() {
                    candidates.push(named);
                }
                candidates.push(subfolder.as_str());

                let outcome = push(
                    self.api,
                    &reference.filename,
                    &candidates,
                    &self.layout.media_dir,
                );
                deck.media.record(&outcome);
            }

            notes.push(template.note(
                &deck_name,
                rewrite(&note.front, &subfolder, Direction::ToStorage),
                rewrite(&note.back, &subfolder, Direction::ToStorage),
                note.tags.into_iter().collect(),
                self.options,
            ));
        }

        let results = self.api.add_notes(&notes)?;
        deck.notes = results.iter().filter(|id| id.is_some()).count();
        deck.notes_rejected = notes.len() - deck.notes;

        info!(
            deck = %deck_name,
            added = deck.notes,
            rejected = deck.notes_rejected,
            media = deck.media.transferred,
            missing = deck.media.missing,
            "Deck imported"
        );
        Ok(())
    }
}

/// Pick the note template notes are created with.
///
/// An explicit `model` must exist. Otherwise `Basic` is preferred, then the
/// first template listed. The first two fields become front and back.
///
/// # Errors
///
/// Fails if the template is unknown, has fewer than two fields, or the
/// application has no template at all.
pub fn resolve_template(api: &dyn AnkiApi, model: Option<&str>) -> SyncResult<NoteTemplate> {
    let names = api.model_names()?;

    let name = match model {
        Some(model) if names.iter().any(|n| n == model) => model.to_string(),
        Some(model) => return Err(SyncError::UnknownModel(model.to_string())),
        None => names
            .iter()
            .find(|n| *n == PREFERRED_MODEL)
            .or_else(|| names.first())
            .cloned()
            .ok_or(SyncError::NoTemplate)?,
    };

    let fields = api.model_field_names(&name)?;
    match fields.as_slice() {
        [front, back, ..] => Ok(NoteTemplate {
            front_field: front.clone(),
            back_field: back.clone(),
            name,
        }),
        _ => Err(SyncError::InvalidTemplate {
            model: name,
            fields: fields.len(),
        }),
    }
}
