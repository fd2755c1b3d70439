//! Content hashing for media change detection.
//!
//! SHA256 over the raw bytes of an asset lets export skip copies whose
//! destination already holds the same content.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};

/// Compute the SHA256 hash of a file without loading it whole.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_hash(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether two files hold identical bytes.
///
/// Sizes are compared first so differing files are rarely hashed. A missing
/// `b` counts as different.
///
/// # Errors
///
/// Returns an error if either file exists but cannot be read.
pub fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    let Ok(b_meta) = b.metadata() else {
        return Ok(false);
    };
    if a.metadata()?.len() != b_meta.len() {
        return Ok(false);
    }
    Ok(file_hash(a)? == file_hash(b)?)
}
