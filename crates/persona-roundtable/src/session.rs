//! Conversation session state.
//!
//! A [`ConversationSession`] owns every persona's history for one topic. It
//! is created by the orchestrator at the start of a run and handed back, read
//! only, once the run reaches [`Phase::Done`].

use crate::history::PersonaState;
use crate::message::ChatMessage;
use crate::persona::Persona;
use serde::{Deserialize, Serialize};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    OpeningRound,
    /// Follow-up round `k`, 1-based.
    FollowUpRound(usize),
    Done,
}

/// One persona's contribution to one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
    /// 0 for the opening round, then 1..=turns.
    pub round: usize,
    /// The text is a failure placeholder rather than a model reply.
    #[serde(default)]
    pub degraded: bool,
}

/// Serializable record of a finished conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub topic: String,
    pub turns: usize,
    pub utterances: Vec<Utterance>,
}

/// State of one conversation: a topic and one history per persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSession {
    topic: String,
    states: Vec<PersonaState>,
    max_turns: usize,
    rounds_completed: usize,
    phase: Phase,
    utterances: Vec<Utterance>,
}

impl ConversationSession {
    pub(crate) fn new(topic: impl Into<String>, personas: &[Persona], max_turns: usize) -> Self {
        Self {
            topic: topic.into(),
            states: personas.iter().cloned().map(PersonaState::new).collect(),
            max_turns,
            rounds_completed: 0,
            phase: Phase::Idle,
            utterances: Vec::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Rounds finished so far, opening round included.
    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Histories in registration order.
    pub fn states(&self) -> &[PersonaState] {
        &self.states
    }

    pub fn state(&self, name: &str) -> Option<&PersonaState> {
        self.states.iter().find(|s| s.persona().name() == name)
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    /// Whether every history holds the same number of peer messages.
    pub fn is_lockstep(&self) -> bool {
        let mut counts = self.states.iter().map(PersonaState::peer_message_count);
        match counts.next() {
            Some(first) => counts.all(|c| c == first),
            None => true,
        }
    }

    pub fn transcript(&self) -> Transcript {
        Transcript {
            topic: self.topic.clone(),
            turns: self.max_turns,
            utterances: self.utterances.clone(),
        }
    }

    pub(crate) fn persona_at(&self, idx: usize) -> &Persona {
        self.states[idx].persona()
    }

    pub(crate) fn history_at(&self, idx: usize) -> &[ChatMessage] {
        self.states[idx].snapshot()
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn complete_round(&mut self) {
        self.rounds_completed += 1;
    }

    /// Folds `line` into every history, the speaker's own included, and
    /// records the utterance.
    pub(crate) fn broadcast(&mut self, utterance: Utterance, line: String) {
        for state in &mut self.states {
            state.append(ChatMessage::peer(utterance.speaker.clone(), line.clone()));
        }
        self.utterances.push(utterance);
    }
}
