//! Per-persona conversation history.

use crate::message::ChatMessage;
use crate::persona::Persona;

/// One persona's private, append-only message history.
///
/// The first message is always the persona's system instruction. Only the
/// orchestrator appends, so every history in a session advances in lockstep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaState {
    persona: Persona,
    messages: Vec<ChatMessage>,
}

impl PersonaState {
    /// Seeds the history with the persona's instruction as a system message.
    pub fn new(persona: Persona) -> Self {
        let messages = vec![ChatMessage::system(persona.instruction())];
        Self { persona, messages }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub(crate) fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The full ordered history, system instruction first.
    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages after the system instruction.
    pub fn peer_message_count(&self) -> usize {
        self.messages.len() - 1
    }

    /// How many times `speaker` has been broadcast into this history.
    pub fn messages_from(&self, speaker: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| m.speaker.as_deref() == Some(speaker))
            .count()
    }
}
