//! # Remote response fallback
//!
//! Forwards free text to an OpenAI-compatible chat-completion endpoint and
//! returns the generated text verbatim. Used for intents marked `dynamic` and
//! (when enabled) for queries the matcher cannot answer confidently.
//!
//! The contract is deliberately blunt: [`remote_reply`] **never fails**. Any
//! transport, deadline, or payload problem is caught and converted into a
//! descriptive string carrying the [`REMOTE_ERROR_PREFIX`] marker, so callers
//! can always log and display *something* and can still tell an error apart
//! from a normal answer. There is no retry and no backoff; the only deadline
//! is one fixed per-request timeout.

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
    },
};
use std::{error::Error, time::Duration};

use tracing::{debug, error};

use crate::config::BotConfig;

/// Marker prefix that distinguishes a remote failure from a normal answer.
pub const REMOTE_ERROR_PREFIX: &str = "[remote error]";

/// Fixed system instruction sent with every forwarded query.
pub const SYSTEM_INSTRUCTION: &str =
    "You are TechBot, a concise assistant for technology questions. \
     Answer briefly and factually.";

/// Creates a new OpenAI API client from configuration.
///
/// # Parameters
/// - `config: &BotConfig`: Configuration containing API base and key.
///
/// # Returns
/// - `Result<Client<OpenAIConfig>, Box<dyn Error>>`: Created client or an error if initialization fails.
fn create_client(config: &BotConfig) -> Result<Client<OpenAIConfig>, Box<dyn Error>> {
    let openai_config = OpenAIConfig::new()
        .with_api_key(config.api_key.clone())
        .with_api_base(config.api_base.clone());
    debug!("Client created with config: {:?}", openai_config);
    Ok(Client::with_config(openai_config))
}

/// Forward a query to the remote endpoint and return its text, or an error
/// string.
///
/// # Parameters
/// - `config`: API base, key, model, and the request deadline.
/// - `user_text`: The user's raw input, forwarded verbatim.
///
/// # Returns
/// The generated text, or a string starting with [`REMOTE_ERROR_PREFIX`]
/// describing what went wrong. This function never returns `Err` and never
/// panics on remote misbehavior.
pub async fn remote_reply(config: &BotConfig, user_text: &str) -> String {
    match try_remote_reply(config, user_text).await {
        Ok(text) => text,
        Err(err) => {
            error!("Remote completion failed: {}", err);
            format!("{REMOTE_ERROR_PREFIX} {err}")
        }
    }
}

async fn try_remote_reply(config: &BotConfig, user_text: &str) -> Result<String, Box<dyn Error>> {
    let client = create_client(config)?;

    let messages = vec![
        ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(
                SYSTEM_INSTRUCTION.to_string(),
            ),
            name: None,
        }),
        ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(user_text.to_string()),
            name: None,
        }),
    ];

    let request = CreateChatCompletionRequestArgs::default()
        .model(config.model.clone())
        .messages(messages)
        .build()?;

    debug!("Sending request: {:?}", request);

    let deadline = Duration::from_secs(config.request_timeout_secs);
    let response = tokio::time::timeout(deadline, client.chat().create(request))
        .await
        .map_err(|_| format!("request deadline of {}s exceeded", config.request_timeout_secs))??;

    let choice = response
        .choices
        .first()
        .ok_or("response contained no choices")?;
    let content = choice
        .message
        .content
        .clone()
        .ok_or("response message had no content")?;

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn mock_config(api_base: String) -> BotConfig {
        BotConfig {
            api_key: "test_key".to_string(),
            api_base,
            model: "test-model".to_string(),
            intents_path: "intents.json".to_string(),
            transcript_path: "transcript.csv".to_string(),
            similarity_threshold: 0.3,
            remote_fallback: true,
            request_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_remote_reply_returns_generated_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({
                        "id": "chatcmpl-1",
                        "object": "chat.completion",
                        "created": 0,
                        "model": "test-model",
                        "choices": [{
                            "index": 0,
                            "message": {
                                "role": "assistant",
                                "content": "Rust is a systems programming language."
                            },
                            "finish_reason": "stop",
                            "logprobs": null
                        }]
                    }));
            })
            .await;

        let config = mock_config(format!("{}/v1", server.base_url()));
        let reply = remote_reply(&config, "what is rust").await;

        mock.assert_async().await;
        assert_eq!(reply, "Rust is a systems programming language.");
        assert!(!reply.starts_with(REMOTE_ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_remote_failure_becomes_error_string() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(500)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({
                        "error": {
                            "message": "boom",
                            "type": "server_error",
                            "param": null,
                            "code": null
                        }
                    }));
            })
            .await;

        let config = mock_config(format!("{}/v1", server.base_url()));
        let reply = remote_reply(&config, "what is rust").await;

        assert!(
            reply.starts_with(REMOTE_ERROR_PREFIX),
            "expected error string, got: {reply}"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_becomes_error_string() {
        // Nothing listens on this port.
        let config = mock_config("http://127.0.0.1:1/v1".to_string());
        let reply = remote_reply(&config, "hello").await;
        assert!(reply.starts_with(REMOTE_ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_empty_choices_becomes_error_string() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({
                        "id": "chatcmpl-2",
                        "object": "chat.completion",
                        "created": 0,
                        "model": "test-model",
                        "choices": []
                    }));
            })
            .await;

        let config = mock_config(format!("{}/v1", server.base_url()));
        let reply = remote_reply(&config, "hello").await;
        assert!(reply.starts_with(REMOTE_ERROR_PREFIX));
        assert!(reply.contains("no choices"));
    }
}
