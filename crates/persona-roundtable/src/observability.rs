//! Log setup for the `roundtable` binary.
//!
//! Library code only emits `tracing` events; nothing here runs unless a
//! caller asks for it. Output defaults to stderr so log lines stay out of the
//! conversation printed on stdout.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Level and destination for roundtable log lines.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub level: Level,
    pub target: LogTarget,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            target: LogTarget::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum LogTarget {
    #[default]
    Console,
    /// Path of a log file; an existing file is truncated.
    File(String),
}

/// Installs a global subscriber filtered to `config.level` for
/// `persona_roundtable` and `roundtable`, on top of any `RUST_LOG` directives.
///
/// Returns an error instead of panicking when a subscriber is already
/// installed or the log file cannot be created.
pub fn init(config: ObservabilityConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("persona_roundtable={}", config.level).parse()?)
        .add_directive(format!("roundtable={}", config.level).parse()?);

    let subscriber = tracing_subscriber::registry().with(filter);

    match config.target {
        LogTarget::Console => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            subscriber.with(layer).try_init()?;
        }
        LogTarget::File(path) => {
            let file = std::fs::File::create(path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file));
            subscriber.with(layer).try_init()?;
        }
    };

    Ok(())
}
