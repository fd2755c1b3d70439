//! Error types for the decksync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=connectivity, 3=template, 4=validation, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

use crate::anki::ApiError;
use crate::sync::SyncError;

/// Result type alias for decksync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Connectivity (exit 2)
    ConnectivityError,

    // Template (exit 3)
    InvalidTemplate,
    UnknownModel,
    NoTemplate,

    // Validation (exit 4)
    InvalidArgument,

    // Sync (exit 6)
    SyncIncomplete,
    SyncError,
    ApiError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ConnectivityError => "CONNECTIVITY_ERROR",
            Self::InvalidTemplate => "INVALID_TEMPLATE",
            Self::UnknownModel => "UNKNOWN_MODEL",
            Self::NoTemplate => "NO_TEMPLATE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::SyncIncomplete => "SYNC_INCOMPLETE",
            Self::SyncError => "SYNC_ERROR",
            Self::ApiError => "API_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::ConnectivityError => 2,
            Self::InvalidTemplate | Self::UnknownModel | Self::NoTemplate => 3,
            Self::InvalidArgument => 4,
            Self::SyncIncomplete | Self::SyncError | Self::ApiError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether re-running may succeed once the cause is fixed outside the
    /// repository (application started, deck file repaired).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectivityError
                | Self::InvalidArgument
                | Self::UnknownModel
                | Self::SyncIncomplete
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can end a decksync command.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Flashcard application unreachable: {0}")]
    Connectivity(String),

    #[error("Note template '{model}' has {fields} field(s); front and back need 2")]
    InvalidTemplate { model: String, fields: usize },

    #[error("Note template not found: {model}")]
    UnknownModel { model: String },

    #[error("The flashcard application has no note template")]
    NoTemplate,

    #[error("{failed} deck(s) failed")]
    SyncIncomplete { failed: usize },

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Application error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Connectivity(_) => ErrorCode::ConnectivityError,
            Self::InvalidTemplate { .. } => ErrorCode::InvalidTemplate,
            Self::UnknownModel { .. } => ErrorCode::UnknownModel,
            Self::NoTemplate => ErrorCode::NoTemplate,
            Self::SyncIncomplete { .. } => ErrorCode::SyncIncomplete,
            Self::Sync(_) => ErrorCode::SyncError,
            Self::Api(_) => ErrorCode::ApiError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Connectivity(_) => Some(
                "Start the flashcard application with the AnkiConnect add-on installed.\n  \
                 Another endpoint: --endpoint <url> or ANKI_CONNECT_URL"
                    .to_string(),
            ),

            Self::InvalidTemplate { .. } => Some(
                "Choose a template with at least two fields: --model <name> or ANKI_MODEL"
                    .to_string(),
            ),

            Self::UnknownModel { .. } => Some(
                "Template names are case-sensitive. Omit --model to use 'Basic' or the first template."
                    .to_string(),
            ),

            Self::NoTemplate => {
                Some("Create a note template in the flashcard application first.".to_string())
            }

            Self::SyncIncomplete { .. } => Some(
                "Finished decks were kept. Fix the errors listed above and re-run for the failed decks."
                    .to_string(),
            ),

            Self::Config(_) => Some("Check ~/.decksync/config.json".to_string()),

            Self::Sync(_)
            | Self::Api(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unreachable(endpoint) => Self::Connectivity(endpoint),
            ApiError::Remote(_) | ApiError::Protocol(_) => Self::Api(err.to_string()),
        }
    }
}

impl From<SyncError> for Error {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Api(e) => e.into(),
            SyncError::Io(e) => Self::Io(e),
            SyncError::InvalidTemplate { model, fields } => Self::InvalidTemplate { model, fields },
            SyncError::UnknownModel(model) => Self::UnknownModel { model },
            SyncError::NoTemplate => Self::NoTemplate,
            other => Self::Sync(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::Connectivity("x".into()).exit_code(), 2);
        assert_eq!(
            Error::InvalidTemplate {
                model: "Cloze".into(),
                fields: 1
            }
            .exit_code(),
            3
        );
        assert_eq!(Error::NoTemplate.exit_code(), 3);
        assert_eq!(Error::InvalidArgument("x".into()).exit_code(), 4);
        assert_eq!(Error::SyncIncomplete { failed: 1 }.exit_code(), 6);
        assert_eq!(Error::Config("x".into()).exit_code(), 7);
        assert_eq!(Error::Other("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_unreachable_maps_to_connectivity() {
        let err: Error = SyncError::Api(ApiError::Unreachable("http://localhost:8765".into())).into();
        assert_eq!(err.error_code(), ErrorCode::ConnectivityError);

        let err: Error = ApiError::Remote("boom".into()).into();
        assert_eq!(err.error_code(), ErrorCode::ApiError);
    }

    #[test]
    fn test_template_errors_survive_conversion() {
        let err: Error = SyncError::InvalidTemplate {
            model: "Cloze".into(),
            fields: 1,
        }
        .into();
        assert!(matches!(err, Error::InvalidTemplate { fields: 1, .. }));

        let err: Error = SyncError::UnknownModel("Nope".into()).into();
        assert_eq!(err.error_code(), ErrorCode::UnknownModel);
    }

    #[test]
    fn test_structured_json() {
        let json = Error::Connectivity("http://localhost:8765".into()).to_structured_json();

        assert_eq!(json["error"]["code"], "CONNECTIVITY_ERROR");
        assert_eq!(json["error"]["exit_code"], 2);
        assert_eq!(json["error"]["retryable"], true);
        assert!(json["error"]["hint"].as_str().unwrap().contains("AnkiConnect"));
    }
}
