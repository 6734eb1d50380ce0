//! Text shapes the orchestrator injects into histories.

use minijinja::{Environment, context};
use serde::Serialize;

pub const DEFAULT_OPENING_TEMPLATE: &str =
    "The topic is: {{ topic }}. Share your initial thoughts.";
pub const DEFAULT_BROADCAST_TEMPLATE: &str = "{{ speaker }} said: {{ content }}";

/// Renders a template string against a serializable context.
pub fn render_prompt<T: Serialize>(template: &str, ctx: T) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("prompt", template)?;
    let tmpl = env.get_template("prompt")?;
    tmpl.render(ctx)
}

/// The opening-round prompt and the broadcast line, as minijinja templates.
///
/// `opening` sees `topic`; `broadcast` sees `speaker` and `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub opening: String,
    pub broadcast: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            opening: DEFAULT_OPENING_TEMPLATE.to_string(),
            broadcast: DEFAULT_BROADCAST_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Parses and renders both templates once with placeholder values.
    pub fn validate(&self) -> Result<(), minijinja::Error> {
        self.opening("validation")?;
        self.broadcast("validation", "validation")?;
        Ok(())
    }

    pub fn opening(&self, topic: &str) -> Result<String, minijinja::Error> {
        render_prompt(&self.opening, context!(topic => topic))
    }

    pub fn broadcast(&self, speaker: &str, content: &str) -> Result<String, minijinja::Error> {
        render_prompt(&self.broadcast, context!(speaker => speaker, content => content))
    }
}
