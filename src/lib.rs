//! # TechBot (library root)
//!
//! This crate provides the core plumbing for the **TechBot** CLI and library:
//! - Intent corpus loading and validation (`intents`).
//! - Text normalization for matching (`normalize`).
//! - TF-IDF / cosine-similarity intent matching (`matcher`).
//! - CSV conversation transcript with search and clear (`transcript`).
//! - Remote chat-completion fallback for dynamic intents (`remote`).
//! - CLI parsing & commands (`commands`), configuration (`config`),
//!   and the interactive terminal surface (`ui`).
//!
//! ## Pipeline at a glance
//! ```text
//! intents.json ──▶ IntentSet ──▶ Matcher (trained once, read-only)
//!                                    │
//! user text ──▶ normalize ──▶ cosine arg-max ──▶ Reply
//!                                    │                │ dynamic / low confidence
//!                                    ▼                ▼
//!                               transcript.csv   remote chat-completion API
//! ```
//!
//! The matcher is built once at startup and never mutated afterwards; changing
//! the corpus means reloading the intent file and training a fresh matcher.
//!
//! ## Modules
//! - [`commands`], [`config`], [`intents`], [`matcher`], [`normalize`],
//!   [`remote`], [`transcript`], [`ui`]

use directories::ProjectDirs;
use std::error::Error;

pub mod commands;
pub mod config;
pub mod intents;
pub mod matcher;
pub mod normalize;
pub mod remote;
pub mod transcript;
pub mod ui;

/// Return the per-platform configuration directory used by TechBot.
///
/// This uses [`directories::ProjectDirs`] with the application triple
/// `("com", "techbot", "techbot")`, so you get the right place on each OS
/// (e.g., `~/.config/techbot` on Linux under XDG).
///
/// The directory is **not** created by this function; callers that need it
/// should create it with `fs::create_dir_all`.
///
/// # Errors
/// Returns an error if the platform configuration directory cannot be
/// determined (rare, but possible in heavily sandboxed environments).
///
/// # Examples
/// ```rust
/// let cfg = techbot::config_dir().expect("has a config dir");
/// println!("config at {}", cfg.display());
/// ```
pub fn config_dir() -> Result<std::path::PathBuf, Box<dyn Error>> {
    let proj_dirs = ProjectDirs::from("com", "techbot", "techbot")
        .ok_or("Unable to determine config directory")?;
    let config_dir = proj_dirs.config_dir().to_path_buf();

    Ok(config_dir)
}
