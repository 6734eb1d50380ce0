//! 'persona-roundtable' - multi-persona LLM conversations over independent histories.
//!
//! Several personas, each a model plus a fixed system instruction, talk about
//! one topic. Every persona keeps its own private message history, and the
//! orchestrator broadcasts each reply into every history (the speaker's own
//! included). N independent point-to-point completion calls thereby behave
//! like one shared multi-party conversation.
//!
//! # Layers
//!
//! - [`completion`]: the [`CompletionBackend`](completion::CompletionBackend)
//!   seam, an Ollama HTTP backend, and [`CompletionClient`](completion::CompletionClient)
//!   with bounded retry that turns exhausted failures into placeholder text.
//! - [`history`]: [`PersonaState`], one append-only history per persona.
//! - [`orchestrator`]: [`ConversationOrchestrator`], which runs the opening
//!   round and the follow-up rounds in registration order.
//! - [`presenter`]: sinks that render utterances as they are produced.
//!
//! # Example
//!
//! ```rust,no_run
//! use persona_roundtable::completion::{CompletionClient, OllamaChatBackend, OllamaConfig};
//! use persona_roundtable::{ConversationOrchestrator, Persona, Utterance};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CompletionClient::new(OllamaChatBackend::new(OllamaConfig::default())?);
//! let orchestrator = ConversationOrchestrator::new(client);
//!
//! let personas = vec![
//!     Persona::new("gemma", "Disagree with everything. Keep responses under 50 words."),
//!     Persona::new("mistral", "Mediate calmly. Keep responses under 50 words."),
//! ];
//!
//! let mut print = |u: &Utterance| println!("[{}] {}: {}", u.round, u.speaker, u.text);
//! let session = orchestrator
//!     .run("Should we colonize Mars?", 3, &personas, &mut print)
//!     .await?;
//!
//! println!("{} utterances", session.utterances().len());
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod message;
pub mod observability;
pub mod orchestrator;
pub mod persona;
pub mod presenter;
pub mod presets;
pub mod prompts;
pub mod session;

pub use completion::{Completion, CompletionBackend, CompletionClient, RetryPolicy};
pub use error::{CompletionError, ConfigError, ConversationError};
pub use history::PersonaState;
pub use message::{ChatMessage, Role};
pub use orchestrator::{ConversationOrchestrator, OrchestratorConfig};
pub use persona::Persona;
pub use presenter::Presenter;
pub use session::{ConversationSession, Phase, Transcript, Utterance};
