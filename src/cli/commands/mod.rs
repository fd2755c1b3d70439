//! Command implementations.

pub mod completions;
pub mod export;
pub mod import;
pub mod list;
pub mod version;

use crate::anki::AnkiConnectClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sync::{RunReport, print_report};

/// Client for the configured endpoint.
fn connect(config: &Config) -> Result<AnkiConnectClient> {
    Ok(AnkiConnectClient::new(config.endpoint.clone())?)
}

/// Print a finished run and turn failed decks into the exit status.
fn finish_run(report: &RunReport, json: bool, quiet: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else if !quiet {
        print_report(report);
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(Error::SyncIncomplete {
            failed: report.totals.decks_failed,
        })
    }
}
