//! Main module for the TechBot CLI application.
//!
//! This module provides the main function and auxiliary functionalities for
//! the CLI application. It handles command parsing, configuration loading, and
//! initialization, as well as invoking the appropriate functionalities based on
//! the provided command-line arguments.
//!
//! # Examples
//!
//! Running the application with the `ask` command:
//!
//! ```sh
//! cargo run -- ask "How do I install Rust?"
//! techbot ask "How do I install Rust?"
//! ```
//!
//! Initializing the application's configuration and starter intent corpus:
//!
//! ```sh
//! cargo run -- init
//! techbot init
//! ```

use clap::Parser;
use once_cell::sync::OnceCell;
use std::{env, error::Error, fs};
use tracing::{debug, info, warn};

use techbot::commands::{self, Commands};
use techbot::config::{self, BotConfig, DEFAULT_SIMILARITY_THRESHOLD};
use techbot::intents::IntentSet;
use techbot::matcher::Matcher;
use techbot::transcript::Transcript;
use techbot::ui::{self, ChatUi};

static TRACING: OnceCell<()> = OnceCell::new();

fn main() -> Result<(), Box<dyn Error>> {
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt::init();
    });
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run())
}

/// Main asynchronous function of the TechBot CLI application.
///
/// Loads configuration, parses command-line arguments, trains the matcher,
/// and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if there is an issue loading the configuration, parsing
/// the command-line arguments, or executing the specified command.
async fn run() -> Result<(), Box<dyn Error>> {
    let cli = commands::Cli::parse();

    // `init` must work before any configuration exists.
    if let Commands::Init = cli.command {
        debug!("Initializing configuration");
        return init();
    }

    let config_path = if env::var("IN_TEST_ENVIRONMENT").is_ok() {
        // If we're in a test environment, load the config from the project directory
        env::current_dir()?.join("config.yaml")
    } else {
        // Otherwise, load the config from the user's config directory
        techbot::config_dir()?.join("config.yaml")
    };

    debug!("Loading config from: {}", config_path.display());
    let config = config::load_config(
        config_path
            .to_str()
            .ok_or("config path is not valid UTF-8")?,
    )?;
    debug!("Config loaded: {:?}", config);

    // An unreadable intent file leaves the bot running but unable to answer
    // anything confidently: every query gets the low-confidence reply.
    let intent_set = match IntentSet::load(&config.intents_path) {
        Ok(set) => set,
        Err(err) => {
            warn!("Failed to load intents from {}: {}", config.intents_path, err);
            eprintln!(
                "Could not load intents from {}: {err}\n\
                 Continuing with an empty corpus; every query will get the fallback reply.",
                config.intents_path
            );
            IntentSet::default()
        }
    };

    let matcher = Matcher::train(&intent_set, config.similarity_threshold);
    let transcript = Transcript::new(&config.transcript_path);

    match cli.command {
        Commands::Chat => {
            let mut chat_ui = ChatUi::new(config, matcher, transcript);
            chat_ui.run().await
        }
        Commands::Ask { question } => {
            debug!("Asking question: {:?}", question);
            let chat_ui = ChatUi::new(config, matcher, transcript);
            let reply = chat_ui.chat_turn(&question).await?;
            println!("{reply}");
            Ok(())
        }
        Commands::History { query } => {
            let turns = match query {
                Some(q) => transcript.search(&q)?,
                None => transcript.load()?,
            };
            if turns.is_empty() {
                println!("No matching conversation history.");
            } else {
                ui::print_turns(&turns);
            }
            Ok(())
        }
        Commands::ClearHistory => {
            transcript.clear()?;
            println!("History cleared.");
            Ok(())
        }
        Commands::Init => unreachable!("handled before config load"),
    }
}

/// Initializes the application's configuration and starter intent corpus.
///
/// Creates the configuration directory with a `config.yaml` and a small
/// `intents.json` the user can grow from. Both are plain files meant to be
/// edited by hand.
///
/// # Errors
///
/// Returns an error if there is an issue creating the directory or files, or
/// serializing the defaults.
fn init() -> Result<(), Box<dyn Error>> {
    let config_dir = techbot::config_dir()?;
    info!("Creating config directory: {}", config_dir.display());
    fs::create_dir_all(&config_dir)?;

    let intents_path = config_dir.join("intents.json");
    info!("Creating starter intents: {}", intents_path.display());
    let starter_intents = serde_json::json!({
        "intents": [
            {
                "tag": "greeting",
                "patterns": ["hi", "hello", "hey there", "good morning"],
                "responses": ["Hello! Ask me a tech question.", "Hi, what can I help you with?"]
            },
            {
                "tag": "farewell",
                "patterns": ["bye", "goodbye", "see you later"],
                "responses": ["Goodbye! Keep learning tech.", "See you around."]
            },
            {
                "tag": "thanks",
                "patterns": ["thanks", "thank you", "much appreciated"],
                "responses": ["You're welcome!", "Any time."]
            },
            {
                "tag": "rust_install",
                "patterns": ["how do I install rust", "set up the rust toolchain"],
                "responses": ["Install rustup from https://rustup.rs and run `rustup default stable`."]
            },
            {
                "tag": "open_question",
                "patterns": ["explain something for me", "tell me about a topic"],
                "responses": ["(answered remotely)"],
                "dynamic": true
            }
        ]
    });
    fs::write(
        &intents_path,
        serde_json::to_string_pretty(&starter_intents)?,
    )?;

    let config_path = config_dir.join("config.yaml");
    info!("Creating config file: {}", config_path.display());
    let config = BotConfig {
        api_key: "CHANGEME".to_string(),
        api_base: "http://localhost:5001/v1".to_string(),
        model: "mistral-7b-openorca".to_string(),
        intents_path: intents_path.to_string_lossy().into_owned(),
        transcript_path: config_dir
            .join("transcript.csv")
            .to_string_lossy()
            .into_owned(),
        similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        remote_fallback: false,
        request_timeout_secs: 30,
    };
    let config_yaml = serde_yaml::to_string(&config)?;
    fs::write(config_path, config_yaml)?;

    println!("Initialized TechBot configuration in {}", config_dir.display());

    Ok(())
}
