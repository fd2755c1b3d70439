//! In-memory application double for pipeline tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use super::api::{AnkiApi, ApiError, ApiResult};
use super::types::{AppNote, NewNote};

struct State {
    reachable: bool,
    decks: BTreeMap<String, Vec<AppNote>>,
    models: Vec<(String, Vec<String>)>,
    media: BTreeMap<String, Vec<u8>>,
    failing_decks: HashSet<String>,
    next_id: u64,
    media_writes: usize,
}

/// Application double keeping decks, notes and media in memory.
///
/// Duplicates are detected on the first field within a deck, like the
/// `deck` duplicate scope of the real application.
pub(crate) struct FakeAnki {
    state: RefCell<State>,
}

impl FakeAnki {
    pub(crate) fn new() -> Self {
        let mut decks = BTreeMap::new();
        decks.insert("Default".to_string(), Vec::new());
        Self {
            state: RefCell::new(State {
                reachable: true,
                decks,
                models: vec![
                    ("Basic".into(), vec!["Front".into(), "Back".into()]),
                    ("Cloze".into(), vec!["Text".into(), "Back Extra".into()]),
                ],
                media: BTreeMap::new(),
                failing_decks: HashSet::new(),
                next_id: 1000,
                media_writes: 0,
            }),
        }
    }

    pub(crate) fn unreachable() -> Self {
        let fake = Self::new();
        fake.state.borrow_mut().reachable = false;
        fake
    }

    pub(crate) fn with_models(self, models: &[(&str, &[&str])]) -> Self {
        self.state.borrow_mut().models = models
            .iter()
            .map(|(name, fields)| {
                (
                    (*name).to_string(),
                    fields.iter().map(|f| (*f).to_string()).collect(),
                )
            })
            .collect();
        self
    }

    pub(crate) fn with_deck(self, name: &str, notes: &[(&str, &str, &[&str])]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let mut stored = Vec::with_capacity(notes.len());
            for (front, back, tags) in notes {
                state.next_id += 1;
                stored.push(AppNote {
                    note_id: state.next_id,
                    model_name: "Basic".into(),
                    fields: vec![
                        ("Front".into(), (*front).to_string()),
                        ("Back".into(), (*back).to_string()),
                    ],
                    tags: tags.iter().map(|t| (*t).to_string()).collect(),
                });
            }
            state.decks.insert(name.to_string(), stored);
        }
        self
    }

    /// Make note lookups for `deck` fail as if the connection dropped.
    pub(crate) fn failing_deck(self, deck: &str) -> Self {
        self.state.borrow_mut().failing_decks.insert(deck.to_string());
        self
    }

    pub(crate) fn notes_in(&self, deck: &str) -> Vec<AppNote> {
        self.state
            .borrow()
            .decks
            .get(deck)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn has_deck(&self, deck: &str) -> bool {
        self.state.borrow().decks.contains_key(deck)
    }

    pub(crate) fn media(&self, filename: &str) -> Option<Vec<u8>> {
        self.state.borrow().media.get(filename).cloned()
    }

    pub(crate) fn media_count(&self) -> usize {
        self.state.borrow().media.len()
    }

    pub(crate) fn media_writes(&self) -> usize {
        self.state.borrow().media_writes
    }

    fn check(&self) -> ApiResult<()> {
        if self.state.borrow().reachable {
            Ok(())
        } else {
            Err(ApiError::Unreachable("fake endpoint".into()))
        }
    }
}

impl AnkiApi for FakeAnki {
    fn version(&self) -> ApiResult<u32> {
        self.check()?;
        Ok(6)
    }

    fn deck_names(&self) -> ApiResult<Vec<String>> {
        self.check()?;
        Ok(self.state.borrow().decks.keys().cloned().collect())
    }

    fn find_notes(&self, deck: &str) -> ApiResult<Vec<u64>> {
        self.check()?;
        let state = self.state.borrow();
        if state.failing_decks.contains(deck) {
            return Err(ApiError::Unreachable("connection reset".into()));
        }
        Ok(state
            .decks
            .get(deck)
            .map(|notes| notes.iter().map(|n| n.note_id).collect())
            .unwrap_or_default())
    }

    fn notes_info(&self, ids: &[u64]) -> ApiResult<Vec<AppNote>> {
        self.check()?;
        let state = self.state.borrow();
        Ok(ids
            .iter()
            .filter_map(|id| {
                state
                    .decks
                    .values()
                    .flatten()
                    .find(|n| n.note_id == *id)
                    .cloned()
            })
            .collect())
    }

    fn create_deck(&self, name: &str) -> ApiResult<()> {
        self.check()?;
        self.state
            .borrow_mut()
            .decks
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    fn add_notes(&self, notes: &[NewNote]) -> ApiResult<Vec<Option<u64>>> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        let mut results = Vec::with_capacity(notes.len());

        for note in notes {
            let Some(fields) = state
                .models
                .iter()
                .find(|(name, _)| *name == note.model_name)
                .map(|(_, fields)| fields.clone())
            else {
                results.push(None);
                continue;
            };

            let ordered: Vec<(String, String)> = fields
                .iter()
                .map(|f| (f.clone(), note.fields.get(f).cloned().unwrap_or_default()))
                .collect();
            let front = ordered.first().map(|(_, v)| v.clone()).unwrap_or_default();

            let next_id = state.next_id + 1;
            let Some(deck) = state.decks.get_mut(&note.deck_name) else {
                results.push(None);
                continue;
            };
            let duplicate = !note.options.allow_duplicate
                && deck.iter().any(|n| n.front() == front);
            if front.trim().is_empty() || duplicate {
                results.push(None);
                continue;
            }

            deck.push(AppNote {
                note_id: next_id,
                model_name: note.model_name.clone(),
                fields: ordered,
                tags: note.tags.clone(),
            });
            state.next_id = next_id;
            results.push(Some(next_id));
        }

        Ok(results)
    }

    fn model_names(&self) -> ApiResult<Vec<String>> {
        self.check()?;
        Ok(self
            .state
            .borrow()
            .models
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn model_field_names(&self, model: &str) -> ApiResult<Vec<String>> {
        self.check()?;
        self.state
            .borrow()
            .models
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, fields)| fields.clone())
            .ok_or_else(|| ApiError::Remote(format!("model was not found: {model}")))
    }

    fn store_media_file(&self, filename: &str, data: &[u8]) -> ApiResult<()> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        state.media.insert(filename.to_string(), data.to_vec());
        state.media_writes += 1;
        Ok(())
    }
}
