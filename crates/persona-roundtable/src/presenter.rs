//! Presentation sinks for produced utterances.
//!
//! The orchestrator only calls into a [`Presenter`]; it never looks at what
//! the presenter does with the text.

use crate::session::Utterance;
use colored::{Color, Colorize};
use std::collections::HashMap;
use tracing::info;

/// Receives every utterance as soon as it is produced.
pub trait Presenter {
    /// Called once before the opening round.
    fn topic(&mut self, _topic: &str) {}

    /// Called before each follow-up round, starting at 1.
    fn round(&mut self, _round: usize) {}

    fn present(&mut self, utterance: &Utterance);
}

impl<F> Presenter for F
where
    F: FnMut(&Utterance),
{
    fn present(&mut self, utterance: &Utterance) {
        self(utterance)
    }
}

const PALETTE: [Color; 6] = [
    Color::BrightRed,
    Color::BrightGreen,
    Color::BrightBlue,
    Color::BrightYellow,
    Color::BrightMagenta,
    Color::BrightCyan,
];

/// Prints utterances to stdout, one colored label per speaker.
///
/// Colors are handed out in order of first appearance, which for a
/// conversation is the roster order.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    colors: HashMap<String, Color>,
    plain: bool,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables ANSI colors.
    pub fn plain(mut self) -> Self {
        self.plain = true;
        self
    }

    fn color_for(&mut self, speaker: &str) -> Color {
        let next = PALETTE[self.colors.len() % PALETTE.len()];
        *self.colors.entry(speaker.to_string()).or_insert(next)
    }

    pub(crate) fn format_utterance(&mut self, utterance: &Utterance) -> String {
        let label = format!("{}:", utterance.speaker.to_uppercase());
        if self.plain {
            return format!("{} {}", label, utterance.text);
        }
        let color = self.color_for(&utterance.speaker);
        format!("{} {}", label.color(color).bold(), utterance.text)
    }
}

impl Presenter for TerminalPresenter {
    fn topic(&mut self, topic: &str) {
        let banner = format!("Conversation Topic: {}", topic);
        if self.plain {
            println!("{}\n{}", banner, "-".repeat(banner.len()));
        } else {
            println!("{}\n{}", banner.bold(), "-".repeat(banner.len()).dimmed());
        }
    }

    fn round(&mut self, round: usize) {
        let header = format!("\nTurn {}", round);
        if self.plain {
            println!("{}", header);
        } else {
            println!("{}", header.bold());
        }
    }

    fn present(&mut self, utterance: &Utterance) {
        let line = self.format_utterance(utterance);
        println!("{}", line);
    }
}

/// Emits every utterance as a structured `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn topic(&mut self, topic: &str) {
        info!(target = "persona_roundtable::transcript", topic, event = "conversation_topic");
    }

    fn round(&mut self, round: usize) {
        info!(target = "persona_roundtable::transcript", round, event = "round_started");
    }

    fn present(&mut self, utterance: &Utterance) {
        info!(
            target = "persona_roundtable::transcript",
            speaker = %utterance.speaker,
            round = utterance.round,
            degraded = utterance.degraded,
            text = %utterance.text,
            event = "utterance"
        );
    }
}
