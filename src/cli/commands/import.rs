//! Import command implementation.

use std::path::PathBuf;

use crate::config::{self, Overrides};
use crate::error::Result;
use crate::sync::{FileSelection, Importer};

/// Import the given files and directories, or every deck file of the
/// repository when none is given.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the application is
/// unreachable, no usable note template exists, or any deck failed.
pub fn execute(overrides: &Overrides, paths: &[PathBuf], json: bool, quiet: bool) -> Result<()> {
    let config = config::resolve(overrides)?;
    let client = super::connect(&config)?;

    let selection = if paths.is_empty() {
        FileSelection::All
    } else {
        FileSelection::Paths(paths.to_vec())
    };

    let report = Importer::new(&client, &config.layout, config.model.as_deref())
        .import(&selection)?;
    super::finish_run(&report, json, quiet)
}
