//! Chat messages as kept in persona histories and sent to the completion service.

use serde::{Deserialize, Serialize};

/// Role of a message on the wire.
///
/// There is no assistant role: a persona's own output comes back to it as a
/// peer-attributed `User` message, the same way everyone else hears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single message in a persona's history.
///
/// Only `role` and `content` go over the wire. `speaker` records which
/// persona a broadcast came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip)]
    pub speaker: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            speaker: None,
        }
    }

    /// An unattributed user message, such as the opening-round prompt.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            speaker: None,
        }
    }

    /// A user message attributed to the persona that said it.
    pub fn peer(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            speaker: Some(speaker.into()),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}
