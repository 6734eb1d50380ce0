//! Error types for the roundtable.

use thiserror::Error;

/// Errors a [`CompletionBackend`](crate::completion::CompletionBackend) can report
/// for a single request.
///
/// These never escape [`CompletionClient`](crate::completion::CompletionClient):
/// every variant is retried, and the last one is folded into placeholder text.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request could not be sent or the connection failed mid-flight.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered 2xx but the body did not carry `message.content`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Whether the service answered with a non-success status.
    ///
    /// A status failure carries no exception detail worth showing, so the
    /// exhausted-retry placeholder reports the attempt count instead.
    pub fn is_status(&self) -> bool {
        matches!(self, CompletionError::Status { .. })
    }
}

/// Fatal errors raised at [`run`](crate::orchestrator::ConversationOrchestrator::run) entry.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// A conversation needs at least one persona.
    #[error("persona roster is empty")]
    EmptyRoster,

    /// Persona names are used for attribution and must be unique.
    #[error("persona '{0}' is registered more than once")]
    DuplicatePersona(String),

    /// A signed turn count below zero.
    #[error("turn count must not be negative, got {0}")]
    NegativeTurns(i64),

    /// A prompt template failed to parse or render.
    #[error("prompt template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Errors raised while loading configuration or roster files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment or CLI value could not be parsed.
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
