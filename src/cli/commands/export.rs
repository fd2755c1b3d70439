//! Export command implementation.

use crate::config::{self, Overrides};
use crate::error::Result;
use crate::sync::{DeckSelection, Exporter};

/// Export the named decks, or every deck when none is named.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the application is
/// unreachable, or any deck failed.
pub fn execute(
    overrides: &Overrides,
    decks: &[String],
    all: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let config = config::resolve(overrides)?;
    let client = super::connect(&config)?;

    let selection = if all || decks.is_empty() {
        DeckSelection::All
    } else {
        DeckSelection::Named(decks.to_vec())
    };

    let report = Exporter::new(&client, &config.layout, &config.app_media_dir).export(&selection)?;
    super::finish_run(&report, json, quiet)
}
