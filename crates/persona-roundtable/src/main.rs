use anyhow::{Context, Result};
use clap::Parser;
use persona_roundtable::completion::{CompletionClient, OllamaChatBackend};
use persona_roundtable::config::{RoundtableConfig, load_roster, normalize_endpoint};
use persona_roundtable::observability::{self, LogTarget, ObservabilityConfig};
use persona_roundtable::orchestrator::turns_from_signed;
use persona_roundtable::presenter::TerminalPresenter;
use persona_roundtable::{ConversationOrchestrator, Transcript, presets};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, warn};

#[derive(Parser)]
#[command(name = "roundtable")]
#[command(about = "Let several LLM personas argue about a topic", long_about = None)]
struct Cli {
    /// Topic to discuss (defaults to the first sample topic)
    #[arg(long, conflicts_with = "all_topics")]
    topic: Option<String>,

    /// Run one conversation per sample topic
    #[arg(long)]
    all_topics: bool,

    /// Follow-up rounds after the opening round
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    turns: i64,

    /// JSON file with an array of {name, instruction, model?}
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Ollama base URL (overrides OLLAMA_HOST)
    #[arg(long)]
    endpoint: Option<String>,

    /// Attempts per completion
    #[arg(long)]
    retries: Option<u32>,

    /// Wait between failed attempts, in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Pause after each follow-up round, in milliseconds
    #[arg(long)]
    round_delay_ms: Option<u64>,

    /// Write the transcript(s) as JSON to this file
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    plain: bool,

    /// Log level for roundtable events
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    observability::init(ObservabilityConfig {
        level: cli.log_level,
        target: cli.log_file.clone().map(LogTarget::File).unwrap_or_default(),
    })
    .map_err(|e| anyhow::anyhow!(e))
    .context("failed to initialize logging")?;

    let mut config = RoundtableConfig::from_env().context("invalid environment configuration")?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = normalize_endpoint(&endpoint);
    }
    if let Some(retries) = cli.retries {
        config.retry.max_attempts = retries;
    }
    if let Some(ms) = cli.retry_delay_ms {
        config.retry.delay = Duration::from_millis(ms);
    }
    if let Some(ms) = cli.round_delay_ms {
        config.round_delay = Duration::from_millis(ms);
    }

    let turns = turns_from_signed(cli.turns)?;
    let personas = match &cli.roster {
        Some(path) => load_roster(path)
            .with_context(|| format!("failed to load roster from {}", path.display()))?,
        None => presets::default_roster(),
    };
    let topics: Vec<String> = if cli.all_topics {
        presets::SAMPLE_TOPICS.iter().map(|t| t.to_string()).collect()
    } else {
        vec![cli.topic.unwrap_or_else(|| presets::SAMPLE_TOPICS[0].to_string())]
    };

    let backend = OllamaChatBackend::new(config.ollama())?;
    if !backend.is_healthy().await {
        warn!(
            endpoint = %backend.endpoint(),
            "Ollama is not answering; replies will be placeholders"
        );
    }

    let client = CompletionClient::new(backend).with_policy(config.retry);
    let orchestrator = ConversationOrchestrator::new(client).with_config(config.orchestrator());

    let mut presenter = TerminalPresenter::new();
    if cli.plain {
        presenter = presenter.plain();
    }

    let mut transcripts: Vec<Transcript> = Vec::new();
    for (i, topic) in topics.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let session = orchestrator
            .run(topic, turns, &personas, &mut presenter)
            .await?;
        transcripts.push(session.transcript());
    }

    if let Some(path) = cli.transcript {
        let json = if transcripts.len() == 1 {
            serde_json::to_string_pretty(&transcripts[0])?
        } else {
            serde_json::to_string_pretty(&transcripts)?
        };
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write transcript to {}", path.display()))?;
    }

    Ok(())
}
