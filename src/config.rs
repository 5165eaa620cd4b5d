//! This module provides functionality for loading and handling the application's configuration.
//!
//! It defines the `BotConfig` struct, which holds the configuration parameters,
//! and a `load_config` function to load the configuration from a YAML file.
//!
//! The `TECHBOT_API_KEY` environment variable, when set, overrides the
//! `api_key` value from the file. No other configuration comes from the
//! environment.
//!
//! # Examples
//!
//! Loading the configuration from a file:
//!
//! ```no_run
//! use techbot::config::{BotConfig, load_config};
//!
//! let config: BotConfig = load_config("/path/to/config.yaml").unwrap();
//! println!("{:?}", config);
//! ```

use serde::{Deserialize, Serialize};
use std::{env, error::Error, fs};

use tracing::*;

/// Name of the environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "TECHBOT_API_KEY";

/// Similarity score below which the matcher reports low confidence.
///
/// Kept as a configuration default rather than a matcher constant so the knob
/// stays visible and overridable per deployment.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

fn default_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_timeout_secs() -> u64 {
    30
}

/// Represents the application's configuration.
///
/// This struct holds the configuration parameters needed to run the
/// application: remote API credentials, the intent corpus and transcript
/// locations, and the similarity threshold. It can be constructed by loading
/// a YAML configuration file using the `load_config` function.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct BotConfig {
    /// The API key used to authenticate requests to the remote API.
    pub api_key: String,

    /// The base URL of the OpenAI-compatible API.
    pub api_base: String,

    /// The name of the model requested for remote completions.
    pub model: String,

    /// Path to the JSON intent corpus.
    pub intents_path: String,

    /// Path to the CSV conversation transcript.
    pub transcript_path: String,

    /// Cosine similarity below this value yields the low-confidence reply.
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,

    /// Whether low-confidence queries are forwarded to the remote API.
    #[serde(default)]
    pub remote_fallback: bool,

    /// Fixed deadline for one remote request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Loads the application's configuration from a YAML file.
///
/// This function reads the file at the given path, parses it as YAML, and
/// constructs a `BotConfig` struct from it. If `TECHBOT_API_KEY` is set in
/// the environment, it replaces the file's `api_key`.
///
/// # Parameters
///
/// - `file`: The path to the YAML configuration file.
///
/// # Returns
///
/// - `Ok(BotConfig)`: The loaded configuration.
/// - `Err(Box<dyn Error>)`: An error occurred while reading the file or parsing the YAML.
///
/// # Examples
///
/// ```no_run
/// use techbot::config::load_config;
///
/// match load_config("/path/to/config.yaml") {
///     Ok(config) => println!("{:?}", config),
///     Err(err) => eprintln!("Error loading config: {}", err),
/// }
/// ```
pub fn load_config(file: &str) -> Result<BotConfig, Box<dyn Error>> {
    debug!("Loading config from: {}", file);
    let content = fs::read_to_string(file)?;
    let mut config: BotConfig = serde_yaml::from_str(&content)?;

    if let Ok(key) = env::var(API_KEY_ENV) {
        info!("Overriding api_key from {}", API_KEY_ENV);
        config.api_key = key;
    }

    Ok(config)
}
