//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;

pub mod commands;

/// Decksync - Two-way sync between a flashcard repository and Anki
#[derive(Parser, Debug)]
#[command(name = "decksync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository root holding decks/ and media/ (default: current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// AnkiConnect endpoint (default: http://localhost:8765)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Anki profile, used to locate its media folder (default: "User 1")
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Anki media folder (default: <data dir>/Anki2/<profile>/collection.media)
    #[arg(long, global = true)]
    pub media_dir: Option<PathBuf>,

    /// Note template for imported cards (default: Basic, else the first one)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// Configuration values given as flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            profile: self.profile.clone(),
            media_dir: self.media_dir.clone(),
            model: self.model.clone(),
            repo: self.repo.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export decks from Anki into the repository
    Export {
        /// Deck names, e.g. "PTSI::Maths::Intégrales" (default: every deck)
        decks: Vec<String>,

        /// Export every deck
        #[arg(long, conflicts_with = "decks")]
        all: bool,
    },

    /// Import deck files from the repository into Anki
    Import {
        /// Deck files or directories (default: every file under decks/)
        paths: Vec<PathBuf>,
    },

    /// List decks or deck files
    List {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Decks in Anki and the file each exports to
    Decks,
    /// Deck files in the repository and the deck each imports into
    Files,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
