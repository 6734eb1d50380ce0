//! Access to the completion service.
//!
//! A [`CompletionBackend`] performs one raw request. [`CompletionClient`] wraps
//! a backend with a fixed retry budget and converts exhausted failures into
//! placeholder text, so the orchestrator always gets something to broadcast.
//!
//! # Example
//!
//! ```rust,no_run
//! use persona_roundtable::completion::{CompletionClient, OllamaChatBackend, OllamaConfig};
//! use persona_roundtable::{ChatMessage, Persona};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = OllamaChatBackend::new(OllamaConfig::default())?;
//! let client = CompletionClient::new(backend);
//!
//! let persona = Persona::new("mistral", "You are a neutral mediator.");
//! let history = vec![
//!     ChatMessage::system(persona.instruction()),
//!     ChatMessage::user("The topic is: tabs vs spaces. Share your initial thoughts."),
//! ];
//! let completion = client.complete(&persona, &history).await;
//! println!("{}", completion.text());
//! # Ok(())
//! # }
//! ```

pub mod ollama;

pub use ollama::{OllamaChatBackend, OllamaConfig};

use crate::error::CompletionError;
use crate::message::ChatMessage;
use crate::persona::Persona;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// A single request to a text-generation service.
///
/// Implementations must not retry; that is [`CompletionClient`]'s job.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Asks `model` for the next utterance given the ordered `messages`.
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for Arc<T> {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        (**self).chat(model, messages).await
    }
}

/// Outcome of [`CompletionClient::complete`].
///
/// Both variants carry text. A degraded completion's text is a visible failure
/// marker that goes through presentation and broadcast like any other reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Success(String),
    Degraded { text: String, reason: String },
}

impl Completion {
    pub fn text(&self) -> &str {
        match self {
            Completion::Success(text) => text,
            Completion::Degraded { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Completion::Success(text) => text,
            Completion::Degraded { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Completion::Degraded { .. })
    }
}

/// Retry budget for a single completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait between two failed attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Completion client with bounded retry and fixed backoff.
pub struct CompletionClient<B> {
    backend: B,
    policy: RetryPolicy,
}

impl<B: CompletionBackend> CompletionClient<B> {
    /// Creates a client with the default policy (3 attempts, 1 second apart).
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Requests the next utterance for `persona` given its full `history`.
    ///
    /// Never fails. Every error is retried until the budget runs out, and the
    /// last one becomes a [`Completion::Degraded`] whose text names the persona.
    pub async fn complete(&self, persona: &Persona, history: &[ChatMessage]) -> Completion {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            match self.backend.chat(persona.model(), history).await {
                Ok(text) => {
                    if attempt > 1 {
                        info!(
                            target = "persona_roundtable::completion",
                            persona = %persona.name(),
                            attempt,
                            max_attempts,
                            event = "completion_recovered"
                        );
                    }
                    return Completion::Success(text);
                }
                Err(err) if attempt < max_attempts => {
                    warn!(
                        target = "persona_roundtable::completion",
                        persona = %persona.name(),
                        attempt,
                        max_attempts,
                        error = %err,
                        delay_ms = self.policy.delay.as_millis() as u64,
                        event = "completion_attempt_failed"
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(err) => {
                    error!(
                        target = "persona_roundtable::completion",
                        persona = %persona.name(),
                        attempts = attempt,
                        error = %err,
                        event = "completion_exhausted"
                    );
                    let text = if err.is_status() {
                        exhausted_text(persona.name(), max_attempts)
                    } else {
                        format!("{} is currently unavailable: {}", persona.name(), err)
                    };
                    return Completion::Degraded {
                        text,
                        reason: err.to_string(),
                    };
                }
            }
        }

        Completion::Degraded {
            text: exhausted_text(persona.name(), max_attempts),
            reason: "no attempts configured".to_string(),
        }
    }
}

fn exhausted_text(name: &str, attempts: u32) -> String {
    format!("Failed to get response from {} after {} attempts.", name, attempts)
}
