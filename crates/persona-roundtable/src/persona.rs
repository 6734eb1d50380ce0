//! Persona definitions.

use serde::{Deserialize, Serialize};

/// A configured conversational identity with a fixed behavioral instruction.
///
/// `name` identifies the persona in broadcasts and placeholders. `model` is the
/// routing key sent to the completion service; when omitted the name is used,
/// so a persona called `mistral` talks to the `mistral` model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    name: String,
    instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

impl Persona {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            model: None,
        }
    }

    /// Routes requests for this persona to a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// The model identifier sent to the completion service.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.name)
    }
}
