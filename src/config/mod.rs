//! Configuration management.
//!
//! Settings come from four layers, first match wins:
//!
//! 1. Command-line flags
//! 2. Environment variables (`ANKI_CONNECT_URL`, `ANKI_PROFILE`,
//!    `ANKI_MEDIA_DIR`, `ANKI_MODEL`, `DECKSYNC_REPO`)
//! 3. `~/.decksync/config.json`
//! 4. Built-in defaults
//!
//! The repository itself is a plain directory holding `decks/` (tabular
//! files, one folder per subject) and `media/` (one folder per media
//! subfolder slug).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::anki::DEFAULT_ENDPOINT;
use crate::error::{Error, Result};

/// Profile used when none is configured.
pub const DEFAULT_PROFILE: &str = "User 1";

/// Settings stored in `~/.decksync/config.json`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub profile: Option<String>,
    pub media_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub repo: Option<PathBuf>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub profile: Option<String>,
    pub media_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub repo: Option<PathBuf>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub endpoint: String,
    pub profile: String,
    /// The application's flat media store.
    pub app_media_dir: PathBuf,
    /// Note template for imports; `None` selects one automatically.
    pub model: Option<String>,
    pub layout: RepoLayout,
}

/// Directory layout of a deck repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoLayout {
    pub root: PathBuf,
    /// Tabular files, `decks/<subject>/<file>.csv`.
    pub decks_dir: PathBuf,
    /// Assets, `media/<subfolder>/<name>`.
    pub media_dir: PathBuf,
}

impl RepoLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            decks_dir: root.join("decks"),
            media_dir: root.join("media"),
            root,
        }
    }
}

/// Get the global decksync directory (`~/.decksync/`).
#[must_use]
pub fn global_decksync_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".decksync"))
}

/// Get the settings file path.
fn config_path() -> Result<PathBuf> {
    global_decksync_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or(Error::Config("Could not determine home directory".into()))
}

/// Load settings from `~/.decksync/config.json`.
///
/// A missing file yields default settings.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&config_path()?)
}

/// Load settings from an explicit file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Default location of the application's media store for `profile`.
///
/// `<data dir>/Anki2/<profile>/collection.media`, where the data dir is
/// `~/.local/share` on Linux, `~/Library/Application Support` on macOS and
/// `%APPDATA%` on Windows.
#[must_use]
pub fn default_app_media_dir(profile: &str) -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| {
        b.data_dir()
            .join("Anki2")
            .join(profile)
            .join("collection.media")
    })
}

/// Resolve the run configuration from flags, the environment and the
/// settings file.
///
/// # Errors
///
/// Returns an error if the settings file is invalid or no media store or
/// repository location can be determined.
pub fn resolve(overrides: &Overrides) -> Result<Config> {
    let settings = load_settings()?;
    resolve_with(overrides, &settings, |key| std::env::var(key).ok())
}

/// Resolution with injectable settings and environment, for tests.
///
/// # Errors
///
/// Returns an error if no media store or repository location can be
/// determined.
pub fn resolve_with(
    overrides: &Overrides,
    settings: &Settings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    // Empty environment values count as unset
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let endpoint = overrides
        .endpoint
        .clone()
        .or_else(|| env("ANKI_CONNECT_URL"))
        .or_else(|| settings.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let profile = overrides
        .profile
        .clone()
        .or_else(|| env("ANKI_PROFILE"))
        .or_else(|| settings.profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    let app_media_dir = overrides
        .media_dir
        .clone()
        .or_else(|| env("ANKI_MEDIA_DIR").map(PathBuf::from))
        .or_else(|| settings.media_dir.clone())
        .or_else(|| default_app_media_dir(&profile))
        .ok_or_else(|| {
            Error::Config("Could not determine the application media directory".into())
        })?;

    let model = overrides
        .model
        .clone()
        .or_else(|| env("ANKI_MODEL"))
        .or_else(|| settings.model.clone());

    let root = match overrides
        .repo
        .clone()
        .or_else(|| env("DECKSYNC_REPO").map(PathBuf::from))
        .or_else(|| settings.repo.clone())
    {
        Some(root) => root,
        None => std::env::current_dir()
            .map_err(|e| Error::Config(format!("Could not determine current directory: {e}")))?,
    };

    Ok(Config {
        endpoint,
        profile,
        app_media_dir,
        model,
        layout: RepoLayout::new(root),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let overrides = Overrides {
            repo: Some("/repo".into()),
            ..Overrides::default()
        };
        let config = resolve_with(&overrides, &Settings::default(), env_of(&[])).unwrap();

        assert_eq!(config.endpoint, "http://localhost:8765");
        assert_eq!(config.profile, "User 1");
        assert!(config.model.is_none());
        assert!(config.app_media_dir.ends_with("Anki2/User 1/collection.media"));
        assert_eq!(config.layout.decks_dir, PathBuf::from("/repo/decks"));
        assert_eq!(config.layout.media_dir, PathBuf::from("/repo/media"));
    }

    #[test]
    fn test_priority_flag_env_file() {
        let settings = Settings {
            endpoint: Some("http://file:1".into()),
            profile: Some("FileProfile".into()),
            model: Some("FileModel".into()),
            repo: Some("/file-repo".into()),
            ..Settings::default()
        };
        let env = env_of(&[
            ("ANKI_CONNECT_URL", "http://env:2"),
            ("ANKI_PROFILE", "EnvProfile"),
        ]);
        let overrides = Overrides {
            endpoint: Some("http://flag:3".into()),
            ..Overrides::default()
        };

        let config = resolve_with(&overrides, &settings, env).unwrap();

        assert_eq!(config.endpoint, "http://flag:3");
        assert_eq!(config.profile, "EnvProfile");
        assert_eq!(config.model.as_deref(), Some("FileModel"));
        assert_eq!(config.layout.root, PathBuf::from("/file-repo"));
        assert!(config.app_media_dir.ends_with("Anki2/EnvProfile/collection.media"));
    }

    #[test]
    fn test_empty_env_is_unset() {
        let overrides = Overrides {
            repo: Some("/repo".into()),
            ..Overrides::default()
        };
        let config = resolve_with(
            &overrides,
            &Settings::default(),
            env_of(&[("ANKI_MODEL", "  "), ("ANKI_MEDIA_DIR", "/media")]),
        )
        .unwrap();

        assert!(config.model.is_none());
        assert_eq!(config.app_media_dir, PathBuf::from("/media"));
    }

    #[test]
    fn test_load_settings_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"endpoint": "http://10.0.0.2:8765", "model": "Basic"}"#).unwrap();

        let settings = load_settings_from(&path).unwrap();

        assert_eq!(settings.endpoint.as_deref(), Some("http://10.0.0.2:8765"));
        assert_eq!(settings.model.as_deref(), Some("Basic"));
        assert!(settings.repo.is_none());
    }

    #[test]
    fn test_load_settings_missing_and_invalid() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            load_settings_from(&temp_dir.path().join("none.json")).unwrap(),
            Settings::default()
        );

        let bad = temp_dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(load_settings_from(&bad), Err(Error::Config(_))));
    }
}
