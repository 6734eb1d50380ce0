//! End-to-end conversation behavior against an in-memory completion backend.

use async_trait::async_trait;
use persona_roundtable::prompts::PromptTemplates;
use persona_roundtable::{
    ChatMessage, CompletionBackend, CompletionClient, CompletionError, ConversationError,
    ConversationOrchestrator, OrchestratorConfig, Persona, Phase, Presenter, RetryPolicy, Role,
    Utterance,
};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Replies deterministically from the request alone and records every call.
#[derive(Default)]
struct RecordingBackend {
    calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    failing: HashSet<String>,
}

impl RecordingBackend {
    fn failing(models: &[&str]) -> Self {
        Self {
            failing: models.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), messages.to_vec()));

        if self.failing.contains(model) {
            return Err(CompletionError::Transport("connection refused".to_string()));
        }
        Ok(format!("{} saw {} messages", model, messages.len()))
    }
}

#[derive(Default)]
struct RecordingPresenter {
    topics: Vec<String>,
    rounds: Vec<usize>,
    utterances: Vec<Utterance>,
}

impl Presenter for RecordingPresenter {
    fn topic(&mut self, topic: &str) {
        self.topics.push(topic.to_string());
    }

    fn round(&mut self, round: usize) {
        self.rounds.push(round);
    }

    fn present(&mut self, utterance: &Utterance) {
        self.utterances.push(utterance.clone());
    }
}

fn roster(names: &[&str]) -> Vec<Persona> {
    names
        .iter()
        .map(|name| Persona::new(*name, format!("You are {}.", name)))
        .collect()
}

fn orchestrator(backend: RecordingBackend) -> ConversationOrchestrator<RecordingBackend> {
    let client = CompletionClient::new(backend).with_policy(RetryPolicy {
        max_attempts: 3,
        delay: Duration::from_secs(1),
    });
    ConversationOrchestrator::new(client)
}

fn contents(messages: &[ChatMessage]) -> Vec<&str> {
    messages.iter().map(|m| m.content.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_opening_round_broadcasts_in_lockstep() {
    let orchestrator = orchestrator(RecordingBackend::default());
    let mut presenter = RecordingPresenter::default();

    let session = orchestrator
        .run("Test", 0, &roster(&["a", "b"]), &mut presenter)
        .await
        .unwrap();

    let a = session.state("a").unwrap();
    let b = session.state("b").unwrap();

    assert_eq!(a.messages_from("b"), 1);
    assert_eq!(b.messages_from("a"), 1);
    assert!(session.is_lockstep());
    assert_eq!(
        contents(a.snapshot()),
        vec!["You are a.", "a said: a saw 2 messages", "b said: b saw 3 messages"]
    );
    assert_eq!(contents(b.snapshot())[1..], contents(a.snapshot())[1..]);
}

#[tokio::test(start_paused = true)]
async fn test_registration_order_controls_what_later_speakers_see() {
    let orchestrator = orchestrator(RecordingBackend::default());
    let mut presenter = RecordingPresenter::default();

    orchestrator
        .run("Test", 0, &roster(&["a", "b"]), &mut presenter)
        .await
        .unwrap();

    let calls = orchestrator.client().backend().calls();
    let opening = "The topic is: Test. Share your initial thoughts.";

    assert_eq!(calls[0].0, "a");
    assert_eq!(contents(&calls[0].1), vec!["You are a.", opening]);

    assert_eq!(calls[1].0, "b");
    assert_eq!(
        contents(&calls[1].1),
        vec!["You are b.", "a said: a saw 2 messages", opening]
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_turns_makes_one_call_per_persona_and_never_pauses() {
    let orchestrator = orchestrator(RecordingBackend::default());
    let mut presenter = RecordingPresenter::default();

    let start = Instant::now();
    let session = orchestrator
        .run("Test", 0, &roster(&["x", "y"]), &mut presenter)
        .await
        .unwrap();

    assert_eq!(orchestrator.client().backend().calls().len(), 2);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(session.phase(), Phase::Done);
    assert_eq!(session.rounds_completed(), 1);
    assert!(presenter.rounds.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_histories_grow_by_one_round_at_a_time() {
    let orchestrator = orchestrator(RecordingBackend::default());
    let mut presenter = RecordingPresenter::default();
    let personas = roster(&["gemma", "qwen", "mistral"]);
    let turns = 2;

    let session = orchestrator
        .run("Should we colonize Mars?", turns, &personas, &mut presenter)
        .await
        .unwrap();

    let n = personas.len();
    let calls = orchestrator.client().backend().calls();
    assert_eq!(calls.len(), n * (turns + 1));

    // Request for speaker `i` in round `r` holds the system message, every
    // earlier round, the speakers before it in this round, and the opening
    // prompt in round 0 only.
    for (call_idx, (model, messages)) in calls.iter().enumerate() {
        let round = call_idx / n;
        let i = call_idx % n;
        let opening_prompt = usize::from(round == 0);
        assert_eq!(model, personas[i].model());
        assert_eq!(messages.len(), 1 + n * round + i + opening_prompt);
    }

    for state in session.states() {
        assert_eq!(state.peer_message_count(), n * (turns + 1));
        assert!(state.snapshot()[0].is_system());
    }
    assert_eq!(session.rounds_completed(), turns + 1);
    assert_eq!(presenter.rounds, vec![1, 2]);
    assert_eq!(presenter.topics, vec!["Should we colonize Mars?"]);
}

#[tokio::test(start_paused = true)]
async fn test_each_follow_up_round_ends_with_the_round_delay() {
    let orchestrator = orchestrator(RecordingBackend::default()).with_config(OrchestratorConfig {
        round_delay: Duration::from_secs(1),
        ..Default::default()
    });
    let mut presenter = RecordingPresenter::default();

    let start = Instant::now();
    orchestrator
        .run("Test", 3, &roster(&["a", "b"]), &mut presenter)
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(
        elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4),
        "expected one pause after each of three follow-up rounds, got {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn test_single_follow_up_round_still_pauses_once() {
    let orchestrator = orchestrator(RecordingBackend::default());
    let mut presenter = RecordingPresenter::default();

    let start = Instant::now();
    let session = orchestrator
        .run("Test", 1, &roster(&["a"]), &mut presenter)
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(
        elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(2),
        "expected exactly one pause, got {:?}",
        elapsed
    );
    assert_eq!(session.phase(), Phase::Done);
}

#[tokio::test(start_paused = true)]
async fn test_speaker_hears_itself_as_a_peer() {
    let orchestrator = orchestrator(RecordingBackend::default());
    let mut presenter = RecordingPresenter::default();

    let session = orchestrator
        .run("Test", 1, &roster(&["a", "b"]), &mut presenter)
        .await
        .unwrap();

    let own = session
        .state("a")
        .unwrap()
        .snapshot()
        .iter()
        .filter(|m| m.speaker.as_deref() == Some("a"))
        .collect::<Vec<_>>();

    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|m| m.role == Role::User));
    assert!(own.iter().all(|m| m.content.starts_with("a said: ")));
}

#[tokio::test(start_paused = true)]
async fn test_failing_persona_degrades_without_stopping_the_conversation() {
    let orchestrator = orchestrator(RecordingBackend::failing(&["b"]));
    let mut presenter = RecordingPresenter::default();

    let start = Instant::now();
    let session = orchestrator
        .run("Test", 1, &roster(&["a", "b", "c"]), &mut presenter)
        .await
        .unwrap();

    let calls = orchestrator.client().backend().calls();
    let calls_to_b = calls.iter().filter(|(model, _)| model == "b").count();
    assert_eq!(calls_to_b, 6, "three attempts in each of two rounds");
    assert!(start.elapsed() >= Duration::from_secs(4));

    let from_b: Vec<_> = presenter
        .utterances
        .iter()
        .filter(|u| u.speaker == "b")
        .collect();
    assert_eq!(from_b.len(), 2);
    assert!(from_b.iter().all(|u| u.degraded));
    assert_eq!(
        from_b[0].text,
        "b is currently unavailable: transport error: connection refused"
    );

    let c = session.state("c").unwrap();
    assert!(
        c.snapshot()
            .iter()
            .any(|m| m.content == "b said: b is currently unavailable: transport error: connection refused")
    );
    assert!(session.is_lockstep());
    assert_eq!(session.phase(), Phase::Done);
    assert_eq!(session.utterances().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_identical_runs_produce_identical_histories() {
    let orchestrator = orchestrator(RecordingBackend::default());
    let personas = roster(&["gemma", "qwen", "mistral"]);

    let mut first_presenter = RecordingPresenter::default();
    let first = orchestrator
        .run("Is social media good for society?", 2, &personas, &mut first_presenter)
        .await
        .unwrap();

    let mut second_presenter = RecordingPresenter::default();
    let second = orchestrator
        .run("Is social media good for society?", 2, &personas, &mut second_presenter)
        .await
        .unwrap();

    assert_eq!(first.states(), second.states());
    assert_eq!(first.utterances(), second.utterances());
    assert_eq!(first_presenter.utterances, second_presenter.utterances);
}

#[tokio::test]
async fn test_invalid_roster_fails_before_any_call() {
    let orchestrator = orchestrator(RecordingBackend::default());
    let mut presenter = RecordingPresenter::default();

    let err = orchestrator
        .run("Test", 1, &[], &mut presenter)
        .await
        .unwrap_err();
    assert!(matches!(err, ConversationError::EmptyRoster));

    let err = orchestrator
        .run("Test", 1, &roster(&["a", "a"]), &mut presenter)
        .await
        .unwrap_err();
    assert!(matches!(err, ConversationError::DuplicatePersona(ref name) if name == "a"));

    assert!(orchestrator.client().backend().calls().is_empty());
    assert!(presenter.topics.is_empty());
}

#[tokio::test]
async fn test_custom_templates_shape_prompt_and_broadcast() {
    let orchestrator = orchestrator(RecordingBackend::default()).with_config(OrchestratorConfig {
        round_delay: Duration::ZERO,
        templates: PromptTemplates {
            opening: "Debate: {{ topic }}".to_string(),
            broadcast: "[{{ speaker }}] {{ content }}".to_string(),
        },
    });
    let mut presenter = RecordingPresenter::default();

    let session = orchestrator
        .run("Tabs or spaces?", 0, &roster(&["a"]), &mut presenter)
        .await
        .unwrap();

    let calls = orchestrator.client().backend().calls();
    assert_eq!(contents(&calls[0].1), vec!["You are a.", "Debate: Tabs or spaces?"]);
    assert_eq!(
        contents(session.state("a").unwrap().snapshot()),
        vec!["You are a.", "[a] a saw 2 messages"]
    );
}

#[tokio::test]
async fn test_broken_template_is_a_configuration_error() {
    let orchestrator = orchestrator(RecordingBackend::default()).with_config(OrchestratorConfig {
        templates: PromptTemplates {
            broadcast: "{{ speaker said".to_string(),
            ..Default::default()
        },
        ..Default::default()
    });
    let mut presenter = RecordingPresenter::default();

    let err = orchestrator
        .run("Test", 0, &roster(&["a"]), &mut presenter)
        .await
        .unwrap_err();

    assert!(matches!(err, ConversationError::Template(_)));
    assert!(orchestrator.client().backend().calls().is_empty());
}

#[tokio::test]
async fn test_broadcast_template_failing_on_real_reply_falls_back_to_default_line() {
    let orchestrator = orchestrator(RecordingBackend::default()).with_config(OrchestratorConfig {
        round_delay: Duration::ZERO,
        templates: PromptTemplates {
            broadcast: "{% if content == \"validation\" %}{{ content }}{% else %}{{ missing() }}{% endif %}"
                .to_string(),
            ..Default::default()
        },
    });
    let mut presenter = RecordingPresenter::default();

    let session = orchestrator
        .run("Test", 0, &roster(&["a", "b"]), &mut presenter)
        .await
        .unwrap();

    assert_eq!(
        contents(session.state("b").unwrap().snapshot()),
        vec!["You are b.", "a said: a saw 2 messages", "b said: b saw 3 messages"]
    );
    assert!(session.is_lockstep());
    assert_eq!(presenter.utterances.len(), 2);
}
