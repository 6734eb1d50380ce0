//! Round scheduling and lockstep broadcast.
//!
//! The orchestrator drives a [`ConversationSession`] through
//! `Idle → OpeningRound → FollowUpRound(1..=turns) → Done`. Within a round,
//! personas speak strictly in registration order. Each reply is presented and
//! then appended to every persona's history, the speaker's own included,
//! before the next persona is asked. Later speakers in a round therefore see
//! everything said before them.
//!
//! # Example
//!
//! ```rust,no_run
//! use persona_roundtable::completion::{CompletionClient, OllamaChatBackend, OllamaConfig};
//! use persona_roundtable::presenter::TerminalPresenter;
//! use persona_roundtable::{ConversationOrchestrator, presets};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CompletionClient::new(OllamaChatBackend::new(OllamaConfig::default())?);
//! let orchestrator = ConversationOrchestrator::new(client);
//!
//! let mut presenter = TerminalPresenter::new();
//! let session = orchestrator
//!     .run("Should AI be used in education?", 2, &presets::default_roster(), &mut presenter)
//!     .await?;
//! assert!(session.is_lockstep());
//! # Ok(())
//! # }
//! ```

use crate::completion::{CompletionBackend, CompletionClient};
use crate::error::ConversationError;
use crate::message::ChatMessage;
use crate::persona::Persona;
use crate::presenter::Presenter;
use crate::prompts::PromptTemplates;
use crate::session::{ConversationSession, Phase, Utterance};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_ROUND_DELAY: Duration = Duration::from_secs(1);

/// Configuration for conversation pacing and injected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Pause after each follow-up round, the last one included. The opening
    /// round is never followed by a pause.
    ///
    /// **Default:** 1 second
    pub round_delay: Duration,

    /// Opening prompt and broadcast line shapes.
    pub templates: PromptTemplates,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            round_delay: DEFAULT_ROUND_DELAY,
            templates: PromptTemplates::default(),
        }
    }
}

/// Runs multi-persona conversations over a [`CompletionClient`].
pub struct ConversationOrchestrator<B> {
    client: CompletionClient<B>,
    config: OrchestratorConfig,
}

impl<B: CompletionBackend> ConversationOrchestrator<B> {
    pub fn new(client: CompletionClient<B>) -> Self {
        Self {
            client,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn client(&self) -> &CompletionClient<B> {
        &self.client
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Runs the opening round and `turns` follow-up rounds on `topic`.
    ///
    /// Fails only on an invalid roster or template, before any completion
    /// is requested. Backend failures show up as degraded utterances instead,
    /// and a broadcast template that fails on a real reply falls back to
    /// `"{speaker} said: {content}"`.
    pub async fn run<P>(
        &self,
        topic: &str,
        turns: usize,
        personas: &[Persona],
        presenter: &mut P,
    ) -> Result<ConversationSession, ConversationError>
    where
        P: Presenter + ?Sized,
    {
        validate_roster(personas)?;
        self.config.templates.validate()?;
        let opening = self.config.templates.opening(topic)?;

        let mut session = ConversationSession::new(topic, personas, turns);
        info!(
            target = "persona_roundtable::conversation",
            topic,
            personas = personas.len(),
            turns,
            event = "conversation_started"
        );

        presenter.topic(topic);
        session.enter(Phase::OpeningRound);
        self.play_round(&mut session, 0, Some(opening.as_str()), &mut *presenter)
            .await?;

        for round in 1..=turns {
            session.enter(Phase::FollowUpRound(round));
            presenter.round(round);
            self.play_round(&mut session, round, None, &mut *presenter)
                .await?;
            tokio::time::sleep(self.config.round_delay).await;
        }

        session.enter(Phase::Done);
        info!(
            target = "persona_roundtable::conversation",
            topic,
            rounds = session.rounds_completed(),
            utterances = session.utterances().len(),
            event = "conversation_finished"
        );

        Ok(session)
    }

    /// One pass over every persona in registration order.
    ///
    /// `prompt` is appended to the request only, never to the stored history.
    async fn play_round<P>(
        &self,
        session: &mut ConversationSession,
        round: usize,
        prompt: Option<&str>,
        presenter: &mut P,
    ) -> Result<(), ConversationError>
    where
        P: Presenter + ?Sized,
    {
        let participant_total = session.states().len();

        for idx in 0..participant_total {
            let persona = session.persona_at(idx).clone();

            let completion = match prompt {
                Some(prompt) => {
                    let mut request = session.history_at(idx).to_vec();
                    request.push(ChatMessage::user(prompt));
                    self.client.complete(&persona, &request).await
                }
                None => self.client.complete(&persona, session.history_at(idx)).await,
            };

            let degraded = completion.is_degraded();
            if degraded {
                warn!(
                    target = "persona_roundtable::conversation",
                    participant = %persona.name(),
                    participant_index = idx,
                    round,
                    event = "dialogue_turn_degraded"
                );
            } else {
                info!(
                    target = "persona_roundtable::conversation",
                    participant = %persona.name(),
                    participant_index = idx,
                    total_participants = participant_total,
                    round,
                    event = "dialogue_turn_completed"
                );
            }

            let text = completion.into_text();
            let line = self.broadcast_line(persona.name(), &text, round);
            let utterance = Utterance {
                speaker: persona.name().to_string(),
                text,
                round,
                degraded,
            };

            presenter.present(&utterance);
            session.broadcast(utterance, line);
        }

        session.complete_round();
        Ok(())
    }
}

impl<B> ConversationOrchestrator<B> {
    /// Renders the broadcast line, falling back to the default shape when a
    /// custom template fails on real content.
    fn broadcast_line(&self, speaker: &str, text: &str, round: usize) -> String {
        match self.config.templates.broadcast(speaker, text) {
            Ok(line) => line,
            Err(err) => {
                warn!(
                    target = "persona_roundtable::conversation",
                    participant = %speaker,
                    round,
                    error = %err,
                    event = "broadcast_template_fallback"
                );
                default_broadcast_line(speaker, text)
            }
        }
    }
}

fn default_broadcast_line(speaker: &str, text: &str) -> String {
    format!("{} said: {}", speaker, text)
}

/// Converts a signed turn count from user input, rejecting negatives.
pub fn turns_from_signed(turns: i64) -> Result<usize, ConversationError> {
    usize::try_from(turns).map_err(|_| ConversationError::NegativeTurns(turns))
}

fn validate_roster(personas: &[Persona]) -> Result<(), ConversationError> {
    if personas.is_empty() {
        return Err(ConversationError::EmptyRoster);
    }

    let mut seen = HashSet::new();
    for persona in personas {
        if !seen.insert(persona.name()) {
            return Err(ConversationError::DuplicatePersona(
                persona.name().to_string(),
            ));
        }
    }
    Ok(())
}
