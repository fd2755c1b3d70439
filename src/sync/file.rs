//! File operations for the deck repository.
//!
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - Discovery of tabular deck files below the decks directory

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::model::deck::DECK_FILE_EXTENSION;
use crate::sync::types::SyncResult;

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file next to the target
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> SyncResult<()> {
    let temp_path = temp_path(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

/// `deck.csv` → `deck.csv.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Whether `path` names a tabular deck file.
#[must_use]
pub fn is_deck_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DECK_FILE_EXTENSION))
}

/// Every tabular file below `dir`, sorted by path.
///
/// A missing directory yields no files.
///
/// # Errors
///
/// Returns an error if a directory below `dir` cannot be read.
pub fn find_deck_files(dir: &Path) -> SyncResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_deck_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Expand explicit selections: directories become the tabular files they
/// contain, anything else is kept as given so a missing file surfaces as a
/// failed deck.
///
/// # Errors
///
/// Returns an error if a selected directory cannot be read.
pub fn expand_paths(paths: &[PathBuf]) -> SyncResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(find_deck_files(path)?);
        } else {
            files.push(path.clone());
        }
    }
    files.dedup();
    Ok(files)
}

/// Get the size of a file in bytes.
///
/// Returns 0 if the file doesn't exist.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ptsi/maths.csv");

        atomic_write(&path, b"line 1\r\nline 2\r\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"line 1\r\nline 2\r\n");
        assert!(!temp_dir.path().join("ptsi/maths.csv.tmp").exists());
    }

    #[test]
    fn test_atomic_write_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deck.csv");

        atomic_write(&path, b"old").unwrap();
        atomic_write(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_find_deck_files_sorted_and_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let decks = temp_dir.path();
        fs::create_dir_all(decks.join("ptsi")).unwrap();
        fs::create_dir_all(decks.join("divers")).unwrap();
        fs::write(decks.join("ptsi/physique.csv"), "").unwrap();
        fs::write(decks.join("ptsi/maths.csv"), "").unwrap();
        fs::write(decks.join("divers/vocabulaire.CSV"), "").unwrap();
        fs::write(decks.join("ptsi/notes.txt"), "").unwrap();

        let files = find_deck_files(decks).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(decks).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            [
                PathBuf::from("divers/vocabulaire.CSV"),
                PathBuf::from("ptsi/maths.csv"),
                PathBuf::from("ptsi/physique.csv"),
            ]
        );
    }

    #[test]
    fn test_find_deck_files_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_deck_files(&temp_dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_expand_paths() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("ptsi");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("maths.csv"), "").unwrap();
        let missing = temp_dir.path().join("missing.csv");

        let files = expand_paths(&[dir.clone(), missing.clone()]).unwrap();

        assert_eq!(files, [dir.join("maths.csv"), missing]);
    }
}
