use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Notelet: plain-markdown notes with automatic naming.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Notes folder to use, overriding the configured one.
    #[arg(long, global = true, env = "NOTELET_ROOT")]
    pub root: Option<PathBuf>,

    /// Configuration file location.
    #[arg(long, global = true, env = "NOTELET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List notes in the folder, most recently modified first.
    List,
    /// Print a note's content.
    Show {
        /// Name or path of the note.
        note: PathBuf,
    },
    /// Create a new note; its name is derived from the content.
    New {
        /// Content of the note. Reads standard input when omitted.
        content: Option<String>,
    },
    /// Rename a note. "Untitled" re-derives the name from the content.
    Rename {
        /// Name or path of the note to rename.
        note: PathBuf,
        /// The new name, without extension.
        name: String,
    },
    /// Delete a note and report which note becomes current.
    Delete {
        /// Name or path of the note to delete.
        note: PathBuf,
    },
    /// Remember a folder as the notes folder.
    UseFolder {
        /// Path to the folder. Created if it does not exist.
        path: PathBuf,
    },
}
