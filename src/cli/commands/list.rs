//! List command implementations.

use crate::anki::AnkiApi;
use crate::cli::ListCommands;
use crate::config::{self, Overrides};
use crate::error::Result;
use crate::sync::{list_decks, list_files, print_decks, print_files};

/// Execute list commands.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the application is
/// unreachable (`list decks`), or the decks directory cannot be read.
pub fn execute(command: &ListCommands, overrides: &Overrides, json: bool) -> Result<()> {
    let config = config::resolve(overrides)?;

    match command {
        ListCommands::Decks => {
            let client = super::connect(&config)?;
            client.version()?;
            let entries = list_decks(&client, &config.layout)?;
            if json {
                println!("{}", serde_json::to_string(&entries)?);
            } else {
                print_decks(&entries);
            }
        }
        ListCommands::Files => {
            let entries = list_files(&config.layout)?;
            if json {
                println!("{}", serde_json::to_string(&entries)?);
            } else {
                print_files(&entries);
            }
        }
    }

    Ok(())
}
