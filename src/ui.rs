//! # Terminal chat surface
//!
//! The interactive loop the `chat` command runs, plus the shared
//! query-answering pipeline used by both interactive and one-shot modes.
//!
//! The surface has four views, modeled as an explicit [`View`] enum rather
//! than string-compared page tags: a home menu, the chat prompt, a history
//! browser with free-text search, and an about panel. Navigation happens
//! through `:`-prefixed commands (`:chat`, `:history`, `:about`, `:home`,
//! `:clear`, `:quit`); in the home view the bare words work too.
//!
//! Every answered chat turn is appended to the transcript. The loop runs one
//! turn at a time on the caller's task; there is no background work to
//! suspend or cancel.

use crossterm::{
    ExecutableCommand,
    style::{Attribute, Color, Print, SetAttribute, SetForegroundColor},
};
use std::{
    error::Error,
    io::{BufRead, Write, stdout},
};

use tracing::debug;

use crate::config::BotConfig;
use crate::matcher::{LOW_CONFIDENCE_REPLY, Matcher, Reply};
use crate::remote;
use crate::transcript::{Transcript, Turn};

/// The screens the interactive surface can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Landing menu.
    Home,
    /// Live chat prompt.
    Chat,
    /// Logged turns with free-text search.
    History,
    /// Static information panel.
    About,
}

/// A parsed `:`-command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Switch to another view.
    Go(View),
    /// Wipe the transcript.
    Clear,
    /// Leave the program.
    Quit,
}

/// Parse a `:`-prefixed navigation command.
///
/// Returns `None` for anything that is not a recognized command, including
/// plain chat text.
pub fn parse_command(input: &str) -> Option<UiCommand> {
    match input.trim() {
        ":home" => Some(UiCommand::Go(View::Home)),
        ":chat" => Some(UiCommand::Go(View::Chat)),
        ":history" => Some(UiCommand::Go(View::History)),
        ":about" => Some(UiCommand::Go(View::About)),
        ":clear" => Some(UiCommand::Clear),
        ":quit" | ":exit" => Some(UiCommand::Quit),
        _ => None,
    }
}

/// Produce the bot's reply for one query.
///
/// Canned intents answer from their response set; intents marked `dynamic`
/// are forwarded to the remote endpoint, as are low-confidence queries when
/// `remote_fallback` is enabled. Otherwise a low-confidence query gets the
/// fixed fallback line. This function never fails: remote problems come back
/// as the remote module's error string.
pub async fn answer_query(config: &BotConfig, matcher: &Matcher, text: &str) -> String {
    match matcher.reply(text) {
        Reply::Answer { dynamic: true, tag, .. } => {
            debug!("Dynamic intent '{}' matched, forwarding to remote", tag);
            remote::remote_reply(config, text).await
        }
        Reply::Answer { text: reply_text, tag, score, .. } => {
            debug!("Matched '{}' at {:.3}", tag, score);
            reply_text
        }
        Reply::LowConfidence { score } if config.remote_fallback => {
            debug!("Low confidence ({:.3}), forwarding to remote", score);
            remote::remote_reply(config, text).await
        }
        Reply::LowConfidence { score } => {
            debug!("Low confidence ({:.3}), using fallback line", score);
            LOW_CONFIDENCE_REPLY.to_string()
        }
    }
}

/// The interactive surface: configuration, trained matcher, transcript, and
/// the current view.
pub struct ChatUi {
    config: BotConfig,
    matcher: Matcher,
    transcript: Transcript,
    view: View,
}

impl ChatUi {
    /// Build the surface; it starts on the home view.
    pub fn new(config: BotConfig, matcher: Matcher, transcript: Transcript) -> Self {
        Self {
            config,
            matcher,
            transcript,
            view: View::Home,
        }
    }

    /// The currently displayed view.
    pub fn view(&self) -> View {
        self.view
    }

    /// Answer one chat query and log the turn.
    pub async fn chat_turn(&self, text: &str) -> Result<String, Box<dyn Error>> {
        let reply = answer_query(&self.config, &self.matcher, text).await;
        self.transcript.append(&Turn::now(text, reply.clone()))?;
        Ok(reply)
    }

    /// Run the interactive loop until the user quits.
    ///
    /// # Errors
    /// Terminal or transcript I/O failures. Remote failures never surface
    /// here; they arrive as error-string replies.
    pub async fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        self.render_view()?;

        loop {
            self.print_prompt()?;
            let Some(line) = lines.next() else {
                break; // stdin closed
            };
            let input = line?;
            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            if let Some(command) = parse_command(input) {
                match command {
                    UiCommand::Quit => break,
                    UiCommand::Clear => {
                        self.transcript.clear()?;
                        println!("History cleared.");
                        continue;
                    }
                    UiCommand::Go(view) => {
                        self.view = view;
                        self.render_view()?;
                        continue;
                    }
                }
            }

            match self.view {
                View::Home => {
                    // Bare menu words navigate from home.
                    match input.to_lowercase().as_str() {
                        "chat" => self.view = View::Chat,
                        "history" => self.view = View::History,
                        "about" => self.view = View::About,
                        "quit" | "exit" => break,
                        _ => println!("Pick one of: chat, history, about, quit."),
                    }
                    self.render_view()?;
                }
                View::Chat => {
                    let reply = self.chat_turn(input).await?;
                    print_bot_line(&reply)?;
                }
                View::History => {
                    let matches = self.transcript.search(input)?;
                    if matches.is_empty() {
                        println!("No logged turns match '{input}'.");
                    } else {
                        print_turns(&matches);
                    }
                }
                View::About => {
                    // The about panel takes no input; nudge back home.
                    println!("Use :home, :chat, or :history to move on.");
                }
            }
        }

        Ok(())
    }

    fn render_view(&self) -> Result<(), Box<dyn Error>> {
        match self.view {
            View::Home => {
                println!("\nTechBot — intent-matching tech chatbot");
                println!("Type 'chat' to talk, 'history' to browse logged turns,");
                println!("'about' for details, or 'quit' to leave.");
                println!("From anywhere: :chat :history :about :home :clear :quit");
            }
            View::Chat => {
                println!("\nChat mode. Ask away; :home to go back.");
            }
            View::History => {
                let turns = self.transcript.load()?;
                if turns.is_empty() {
                    println!("\nNo conversation history yet.");
                } else {
                    println!("\n{} logged turn(s):", turns.len());
                    print_turns(&turns);
                }
                println!("Type text to search the history, or :clear to wipe it.");
            }
            View::About => {
                println!("\nTechBot answers tech questions from a JSON intent corpus");
                println!("using TF-IDF cosine matching (threshold {}).", self.matcher.threshold());
                println!("Unmatched or dynamic queries go to {}.", self.config.api_base);
                println!("Turns are logged to {}.", self.transcript.path().display());
            }
        }
        Ok(())
    }

    fn print_prompt(&self) -> Result<(), Box<dyn Error>> {
        let mut stdout = stdout();
        let prompt = match self.view {
            View::Home => "menu> ",
            View::Chat => "You: ",
            View::History => "search> ",
            View::About => "> ",
        };
        stdout.execute(SetForegroundColor(Color::Green))?;
        stdout.execute(Print(prompt))?;
        stdout.execute(SetForegroundColor(Color::Reset))?;
        stdout.flush()?;
        Ok(())
    }
}

fn print_bot_line(reply: &str) -> Result<(), Box<dyn Error>> {
    let mut stdout = stdout();
    stdout.execute(SetForegroundColor(Color::Blue))?;
    stdout.execute(SetAttribute(Attribute::Bold))?;
    stdout.execute(Print(format!("Bot: {reply}\n")))?;
    stdout.execute(SetAttribute(Attribute::Reset))?;
    stdout.execute(SetForegroundColor(Color::Reset))?;
    Ok(())
}

/// Print turns in transcript order, oldest first.
pub fn print_turns(turns: &[Turn]) {
    for turn in turns {
        println!("[{}] You: {}", turn.timestamp, turn.user_text);
        println!("[{}] Bot: {}", turn.timestamp, turn.bot_text);
    }
}
