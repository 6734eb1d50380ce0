//! Built-in roster and topics.

use crate::persona::Persona;

/// Topics used when none is given on the command line.
pub const SAMPLE_TOPICS: [&str; 5] = [
    "Should AI be used in education?",
    "Is social media good for society?",
    "Should we colonize Mars?",
    "Are electric vehicles the future of transportation?",
    "Should remote work be the new normal?",
];

/// Three contrasting personalities served by local Ollama models.
pub fn default_roster() -> Vec<Persona> {
    vec![
        Persona::new(
            "gemma",
            "You are a chatbot who is very argumentative. You disagree with anything in the \
             conversation and you challenge everything, in a snarky way. \
             Keep responses under 50 words.",
        ),
        Persona::new(
            "qwen:7b",
            "You are a very polite, courteous chatbot. You try to agree with everything the \
             other person says, or find common ground. If others are argumentative, you try \
             to calm them down. Keep responses under 50 words.",
        ),
        Persona::new(
            "mistral",
            "You are a neutral and analytical chatbot who tries to mediate discussions with \
             logic and reason. You aim to find balanced perspectives and encourage productive \
             dialogue. Keep responses under 50 words.",
        ),
    ]
}
