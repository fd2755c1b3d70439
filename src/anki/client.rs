//! AnkiConnect HTTP client.
//!
//! AnkiConnect exposes the application as a single local endpoint taking
//! `{"action", "version", "params"}` and answering `{"result", "error"}`.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::api::{AnkiApi, ApiError, ApiResult};
use super::types::{AppNote, NewNote, RawNoteInfo};

/// Default AnkiConnect endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8765";

/// AnkiConnect protocol version spoken by this client.
pub const API_VERSION: u8 = 6;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Large decks make `addNotes` slow, so the overall timeout is generous.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct Request<'a> {
    action: &'a str,
    version: u8,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Blocking AnkiConnect client.
pub struct AnkiConnectClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl AnkiConnectClient {
    /// Create a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(endpoint: impl Into<String>) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Protocol(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Perform one action and decode its result.
    fn request<T: DeserializeOwned>(&self, action: &str, params: Value) -> ApiResult<T> {
        debug!(action, endpoint = %self.endpoint, "AnkiConnect request");

        let body = Request {
            action,
            version: API_VERSION,
            params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| ApiError::Unreachable(format!("{} ({e})", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Protocol(format!("{action}: HTTP {status}")));
        }

        let payload: Response = response
            .json()
            .map_err(|e| ApiError::Protocol(format!("{action}: {e}")))?;

        if let Some(error) = payload.error {
            return Err(ApiError::Remote(format!("{action}: {error}")));
        }

        serde_json::from_value(payload.result)
            .map_err(|e| ApiError::Protocol(format!("{action}: {e}")))
    }
}

impl AnkiApi for AnkiConnectClient {
    fn version(&self) -> ApiResult<u32> {
        self.request("version", json!({}))
    }

    fn deck_names(&self) -> ApiResult<Vec<String>> {
        self.request("deckNames", json!({}))
    }

    /// Child decks are excluded: each nested deck is exported on its own.
    fn find_notes(&self, deck: &str) -> ApiResult<Vec<u64>> {
        let deck = escape_query(deck);
        let query = format!("\"deck:{deck}\" -\"deck:{deck}::*\"");
        self.request("findNotes", json!({ "query": query }))
    }

    fn notes_info(&self, ids: &[u64]) -> ApiResult<Vec<AppNote>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<RawNoteInfo> = self.request("notesInfo", json!({ "notes": ids }))?;
        Ok(raw.into_iter().filter_map(RawNoteInfo::into_note).collect())
    }

    fn create_deck(&self, name: &str) -> ApiResult<()> {
        let _id: Option<u64> = self.request("createDeck", json!({ "deck": name }))?;
        Ok(())
    }

    /// Screens the batch with `canAddNotes` first: `addNotes` rejects a
    /// whole batch on some AnkiConnect versions as soon as one note is a
    /// duplicate.
    fn add_notes(&self, notes: &[NewNote]) -> ApiResult<Vec<Option<u64>>> {
        if notes.is_empty() {
            return Ok(Vec::new());
        }

        let addable: Vec<bool> = self.request("canAddNotes", json!({ "notes": notes }))?;
        if addable.len() != notes.len() {
            return Err(ApiError::Protocol(format!(
                "canAddNotes: expected {} answers, got {}",
                notes.len(),
                addable.len()
            )));
        }

        let accepted: Vec<&NewNote> = notes
            .iter()
            .zip(&addable)
            .filter_map(|(note, ok)| ok.then_some(note))
            .collect();

        let ids: Vec<Option<u64>> = if accepted.is_empty() {
            Vec::new()
        } else {
            self.request("addNotes", json!({ "notes": accepted }))?
        };

        let mut ids = ids.into_iter();
        Ok(addable
            .iter()
            .map(|ok| if *ok { ids.next().flatten() } else { None })
            .collect())
    }

    fn model_names(&self) -> ApiResult<Vec<String>> {
        self.request("modelNames", json!({}))
    }

    fn model_field_names(&self, model: &str) -> ApiResult<Vec<String>> {
        self.request("modelFieldNames", json!({ "modelName": model }))
    }

    fn store_media_file(&self, filename: &str, data: &[u8]) -> ApiResult<()> {
        let encoded = STANDARD.encode(data);
        let _stored: Option<String> = self.request(
            "storeMediaFile",
            json!({ "filename": filename, "data": encoded }),
        )?;
        Ok(())
    }
}

/// Escape a deck name for use inside a quoted search term.
fn escape_query(deck: &str) -> String {
    let mut escaped = String::with_capacity(deck.len());
    for c in deck.chars() {
        if matches!(c, '"' | '\\' | '*' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
