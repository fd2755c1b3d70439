//! Payload types exchanged with the automation interface.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A note as returned by the application, fields in template order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppNote {
    pub note_id: u64,
    pub model_name: String,
    pub fields: Vec<(String, String)>,
    pub tags: Vec<String>,
}

impl AppNote {
    /// Value of the first field.
    #[must_use]
    pub fn front(&self) -> &str {
        self.field_value(0)
    }

    /// Value of the second field, empty for single-field templates.
    #[must_use]
    pub fn back(&self) -> &str {
        self.field_value(1)
    }

    fn field_value(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", |(_, value)| value.as_str())
    }
}

/// Wire shape of one `notesInfo` entry. Unknown IDs come back as `{}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawNoteInfo {
    #[serde(default)]
    note_id: Option<u64>,
    #[serde(default)]
    model_name: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    fields: HashMap<String, RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    value: String,
    #[serde(default)]
    order: u32,
}

impl RawNoteInfo {
    pub(crate) fn into_note(self) -> Option<AppNote> {
        let note_id = self.note_id?;
        let mut fields: Vec<(u32, String, String)> = self
            .fields
            .into_iter()
            .map(|(name, field)| (field.order, name, field.value))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        Some(AppNote {
            note_id,
            model_name: self.model_name,
            fields: fields.into_iter().map(|(_, name, value)| (name, value)).collect(),
            tags: self.tags,
        })
    }
}

/// How far duplicate detection reaches when adding notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateScope {
    /// Only notes of the target deck count as duplicates.
    #[default]
    Deck,
    /// Any note of the collection counts.
    Collection,
}

/// Duplicate policy sent with every new note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    pub allow_duplicate: bool,
    pub duplicate_scope: DuplicateScope,
}

impl Default for NoteOptions {
    /// Reject duplicates within the deck, so re-imports add nothing.
    fn default() -> Self {
        Self {
            allow_duplicate: false,
            duplicate_scope: DuplicateScope::Deck,
        }
    }
}

/// A note submitted to the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub options: NoteOptions,
}

/// A note template usable for two-sided cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteTemplate {
    pub name: String,
    pub front_field: String,
    pub back_field: String,
}

impl NoteTemplate {
    /// Build a note of this template for `deck`.
    #[must_use]
    pub fn note(
        &self,
        deck: &str,
        front: String,
        back: String,
        tags: Vec<String>,
        options: NoteOptions,
    ) -> NewNote {
        let mut fields = BTreeMap::new();
        fields.insert(self.front_field.clone(), front);
        fields.insert(self.back_field.clone(), back);

        NewNote {
            deck_name: deck.to_string(),
            model_name: self.name.clone(),
            fields,
            tags,
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_note_orders_fields() {
        let raw: RawNoteInfo = serde_json::from_value(serde_json::json!({
            "noteId": 1502298033753_u64,
            "modelName": "Basic",
            "tags": ["maths"],
            "fields": {
                "Back": {"value": "A", "order": 1},
                "Front": {"value": "Q", "order": 0}
            },
            "cards": [1498938915662_u64]
        }))
        .unwrap();

        let note = raw.into_note().unwrap();
        assert_eq!(note.note_id, 1_502_298_033_753);
        assert_eq!(note.front(), "Q");
        assert_eq!(note.back(), "A");
        assert_eq!(note.tags, ["maths"]);
    }

    #[test]
    fn test_raw_note_unknown_id() {
        let raw: RawNoteInfo = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(raw.into_note().is_none());
    }

    #[test]
    fn test_single_field_note_has_empty_back() {
        let note = AppNote {
            note_id: 1,
            model_name: "Cloze".into(),
            fields: vec![("Text".into(), "{{c1::x}}".into())],
            tags: vec![],
        };
        assert_eq!(note.back(), "");
    }

    #[test]
    fn test_new_note_wire_format() {
        let template = NoteTemplate {
            name: "Basic".into(),
            front_field: "Front".into(),
            back_field: "Back".into(),
        };
        let note = template.note(
            "PTSI::Maths",
            "Q".into(),
            "A".into(),
            vec!["t1".into()],
            NoteOptions::default(),
        );

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "deckName": "PTSI::Maths",
                "modelName": "Basic",
                "fields": {"Back": "A", "Front": "Q"},
                "tags": ["t1"],
                "options": {"allowDuplicate": false, "duplicateScope": "deck"}
            })
        );
    }
}
