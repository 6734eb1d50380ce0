//! OllamaChatBackend - Ollama `/api/chat` HTTP implementation.
//!
//! Sends the full message history for one model and reads back
//! `message.content`. Streaming is always disabled.
//!
//! # Example
//!
//! ```rust,no_run
//! use persona_roundtable::completion::{OllamaChatBackend, OllamaConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = OllamaChatBackend::new(OllamaConfig {
//!     endpoint: "http://192.168.1.100:11434".to_string(),
//!     timeout: Duration::from_secs(30),
//! })?;
//!
//! if !backend.is_healthy().await {
//!     eprintln!("Ollama is not reachable at {}", backend.endpoint());
//! }
//! # Ok(())
//! # }
//! ```

use super::CompletionBackend;
use crate::error::CompletionError;
use crate::message::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub(crate) const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`OllamaChatBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Server base URL, e.g. `http://localhost:11434`.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Backend that talks to an Ollama-compatible chat endpoint.
#[derive(Clone)]
pub struct OllamaChatBackend {
    config: OllamaConfig,
    client: Client,
}

impl OllamaChatBackend {
    pub fn new(config: OllamaConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// Checks whether the server answers its model listing.
    pub async fn is_healthy(&self) -> bool {
        match self.client.get(self.url("/api/tags")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl CompletionBackend for OllamaChatBackend {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model,
            messages,
            stream: false,
        };

        debug!(
            target = "persona_roundtable::completion",
            model,
            messages = messages.len(),
            event = "chat_request"
        );

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        Ok(chat.message.content)
    }
}

// =============================================================================
// Request/Response types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

// =============================================================================
// Tests
// =============================================================================
