//! # Conversation transcript
//!
//! Flat CSV log of every chat turn, with columns
//! `Timestamp, User Input, Bot Response`.
//!
//! The log is unbounded and effectively append-only: rows are never updated
//! or deleted individually. An append re-reads the whole file, pushes the new
//! turn, and rewrites the file in full, matching the read-modify-append-write
//! contract of the log format. Clearing the history deletes the file
//! entirely; the next append recreates it with a header and one row.
//!
//! There is exactly one logical writer (the local process), so no
//! cross-writer atomicity is provided.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

/// One logged chat turn.
///
/// The timestamp is stored as a preformatted local-time string because the
/// transcript is a human-facing flat file, not a queryable store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Turn {
    /// Local time the turn was logged, `YYYY-MM-DD HH:MM:SS`.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    /// What the user typed.
    #[serde(rename = "User Input")]
    pub user_text: String,

    /// What the bot answered.
    #[serde(rename = "Bot Response")]
    pub bot_text: String,
}

impl Turn {
    /// Build a turn stamped with the current local time.
    pub fn now(user_text: impl Into<String>, bot_text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            user_text: user_text.into(),
            bot_text: bot_text.into(),
        }
    }
}

/// Handle to the on-disk CSV transcript.
///
/// Holds only the path; every operation opens the file fresh, so the handle
/// is cheap to clone and trivially consistent with external deletion.
#[derive(Debug, Clone)]
pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    /// Create a handle for the transcript at `path`. The file itself is not
    /// touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The underlying file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all logged turns, oldest first.
    ///
    /// A missing file is an empty history, not an error.
    ///
    /// # Errors
    /// I/O failures other than "not found", or malformed CSV rows.
    pub fn load(&self) -> Result<Vec<Turn>, Box<dyn Error>> {
        let mut reader = match csv::Reader::from_path(&self.path) {
            Ok(reader) => reader,
            Err(err) => {
                if let csv::ErrorKind::Io(io_err) = err.kind() {
                    if io_err.kind() == ErrorKind::NotFound {
                        return Ok(Vec::new());
                    }
                }
                return Err(err.into());
            }
        };

        let mut turns = Vec::new();
        for record in reader.deserialize() {
            let turn: Turn = record?;
            turns.push(turn);
        }
        Ok(turns)
    }

    /// Append one turn: read everything, push, rewrite the file in full.
    ///
    /// Recreates the file (with its header row) if it was cleared or never
    /// existed.
    ///
    /// # Errors
    /// I/O or CSV serialization failures.
    pub fn append(&self, turn: &Turn) -> Result<(), Box<dyn Error>> {
        let mut turns = self.load()?;
        turns.push(turn.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for turn in &turns {
            writer.serialize(turn)?;
        }
        writer.flush()?;

        debug!("Transcript now holds {} turns", turns.len());
        Ok(())
    }

    /// Case-insensitive substring search over user and bot text.
    ///
    /// An empty query returns the whole history.
    pub fn search(&self, query: &str) -> Result<Vec<Turn>, Box<dyn Error>> {
        let needle = query.to_lowercase();
        let turns = self.load()?;
        Ok(turns
            .into_iter()
            .filter(|t| {
                needle.is_empty()
                    || t.user_text.to_lowercase().contains(&needle)
                    || t.bot_text.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Delete the transcript file. Clearing an already-empty history is a
    /// no-op.
    ///
    /// # Errors
    /// I/O failures other than "not found".
    pub fn clear(&self) -> Result<(), Box<dyn Error>> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
