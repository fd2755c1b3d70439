//! Moving asset bytes between the two media stores.
//!
//! Export pulls from the application's flat store into the repository's
//! per-deck folders. Import pushes from the repository into the application
//! through its store-by-name primitive. Neither direction fails a deck: every
//! attempt ends in an [`Outcome`] that the orchestrator counts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::anki::AnkiApi;
use crate::media::hash::same_content;

/// Result of one transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Copied into the repository.
    Copied,
    /// Destination already held identical bytes.
    Unchanged,
    /// Handed to the application store.
    Uploaded,
    /// Source file not found.
    Missing,
    /// Source found but the transfer itself failed.
    Failed(String),
}

/// Per-deck media counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaStats {
    /// Copied or uploaded.
    pub transferred: usize,
    /// Skipped because the destination already matched.
    pub unchanged: usize,
    pub missing: usize,
    pub failed: usize,
}

impl MediaStats {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Copied | Outcome::Uploaded => self.transferred += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Missing => self.missing += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    /// Add another deck's counts.
    pub fn absorb(&mut self, other: &Self) {
        self.transferred += other.transferred;
        self.unchanged += other.unchanged;
        self.missing += other.missing;
        self.failed += other.failed;
    }

    /// Number of references processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.transferred + self.unchanged + self.missing + self.failed
    }
}

/// Copy `filename` from the application's flat store into
/// `repo_media_root/subfolder/`.
///
/// An existing destination with different content is overwritten.
pub fn pull(filename: &str, subfolder: &str, source_root: &Path, repo_media_root: &Path) -> Outcome {
    if !is_safe_name(filename) {
        return unsafe_name(filename);
    }

    let source = source_root.join(filename);
    if !source.is_file() {
        warn!(file = %source.display(), "Media missing from application store");
        return Outcome::Missing;
    }

    let dest_dir = if subfolder.is_empty() {
        repo_media_root.to_path_buf()
    } else {
        repo_media_root.join(subfolder)
    };
    let dest = dest_dir.join(filename);

    match same_content(&source, &dest) {
        Ok(true) => {
            debug!(file = filename, "Media unchanged");
            return Outcome::Unchanged;
        }
        Ok(false) => {}
        Err(e) => return failed(filename, &e),
    }

    if let Err(e) = fs::create_dir_all(&dest_dir) {
        return failed(filename, &e);
    }
    match fs::copy(&source, &dest) {
        Ok(_) => {
            debug!(file = filename, dest = %dest.display(), "Media copied");
            Outcome::Copied
        }
        Err(e) => failed(filename, &e),
    }
}

/// Upload `filename` from the repository to the application store.
///
/// The file is looked up in each of `subfolders` in order, then at the root
/// of `repo_media_root`. The application overwrites any asset of the same
/// name.
pub fn push<A: AnkiApi + ?Sized>(
    api: &A,
    filename: &str,
    subfolders: &[&str],
    repo_media_root: &Path,
) -> Outcome {
    if !is_safe_name(filename) {
        return unsafe_name(filename);
    }

    let Some(source) = locate(filename, subfolders, repo_media_root) else {
        warn!(file = filename, "Media missing from repository");
        return Outcome::Missing;
    };

    let data = match fs::read(&source) {
        Ok(data) => data,
        Err(e) => return failed(filename, &e),
    };

    match api.store_media_file(filename, &data) {
        Ok(()) => {
            debug!(file = filename, bytes = data.len(), "Media uploaded");
            Outcome::Uploaded
        }
        Err(e) => failed(filename, &e),
    }
}

/// First existing candidate path for `filename` in the repository.
#[must_use]
pub fn locate(filename: &str, subfolders: &[&str], repo_media_root: &Path) -> Option<PathBuf> {
    subfolders
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| repo_media_root.join(s).join(filename))
        .chain(std::iter::once(repo_media_root.join(filename)))
        .find(|p| p.is_file())
}

/// A base name that cannot escape its folder.
fn is_safe_name(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\'])
}

fn unsafe_name(filename: &str) -> Outcome {
    warn!(file = filename, "Refusing media reference with an unsafe name");
    Outcome::Failed(format!("unsafe media file name: {filename:?}"))
}

fn failed(filename: &str, error: &dyn std::fmt::Display) -> Outcome {
    warn!(file = filename, error = %error, "Media transfer failed");
    Outcome::Failed(format!("{filename}: {error}"))
}
