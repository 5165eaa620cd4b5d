//! This module defines the command-line interface for the application using `clap`.
//!
//! It provides a `Cli` struct that represents the parsed command-line arguments,
//! and a `Commands` enum that represents the available subcommands and their
//! options.
//!
//! # Examples
//!
//! ```sh
//! techbot init
//! techbot chat
//! techbot ask "how do I install rust?"
//! techbot history rust
//! techbot clear-history
//! ```

use clap::{Parser, Subcommand};

/// Represents the parsed command-line arguments.
///
/// This struct is constructed by parsing the command-line arguments using `clap`.
/// It contains a `command` field that holds the parsed subcommand and its options.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true, color = clap::ColorChoice::Always)]
pub struct Cli {
    /// The parsed subcommand and its options.
    #[command(subcommand)]
    pub command: Commands,
}

/// Represents the available subcommands and their options.
///
/// Each variant of this enum corresponds to a subcommand that the user can invoke
/// from the command line, along with any options specific to that subcommand.
#[derive(Subcommand, Debug)]
#[command(about, long_about = None, color = clap::ColorChoice::Always)]
pub enum Commands {
    /// The 'chat' subcommand: the interactive terminal surface.
    ///
    /// This subcommand can be invoked with either 'c' or 'chat'.
    #[clap(name = "chat", alias = "c")]
    Chat,

    /// The 'ask' subcommand: answer a single question and exit.
    #[clap(name = "ask", alias = "a")]
    Ask {
        /// The question to be asked.
        question: String,
    },

    /// The 'history' subcommand: print logged turns, optionally filtered.
    #[clap(name = "history", alias = "h")]
    History {
        /// Case-insensitive substring to search for; omit to print everything.
        query: Option<String>,
    },

    /// The 'clear-history' subcommand: delete the conversation transcript.
    #[clap(name = "clear-history")]
    ClearHistory,

    /// The 'init' subcommand, which takes no arguments and is used for initialization.
    ///
    /// When invoked, this subcommand creates the configuration directory with
    /// a starter `config.yaml` and `intents.json`.
    Init,
}
