//! Command line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flashcards", about = "Danish vocabulary flashcards with SM-2 spaced repetition", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the graphical review application (default)
    Gui,

    /// List cards due now, most overdue first
    Due {
        /// Only this deck
        #[arg(long)]
        deck: Option<String>,
    },

    /// Advance the review clock by one day
    NextDay,

    /// Import a deck from a JSON file
    Import { path: PathBuf },

    /// Export a deck to a JSON file
    Export { deck: String, path: PathBuf },

    /// Write all progress records to a JSON file
    ExportProgress { path: PathBuf },

    /// Load progress records from a JSON file, replacing stored ones with the same id
    ImportProgress { path: PathBuf },

    /// Write the effective configuration as YAML (default: the user config file)
    InitConfig {
        path: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}
