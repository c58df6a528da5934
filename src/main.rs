//! voice-assistant: wake-phrase driven voice command assistant
//!
//! Listens for a wake phrase, captures one command, classifies it by
//! keyword, dispatches it to a handler and speaks the answer.
//!
//! Components:
//! - Pattern classifier with first-match keyword sets
//! - Action registry with one handler per command category
//! - Session state machine owning the listen/activate/execute cycle
//! - Text-mode capture and render stand-ins for STT and TTS engines

mod actions;
mod command;
mod config;
mod events;
mod history;
mod lifecycle;
mod session;
mod speech;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::actions::handlers::{self, HandlerDeps};
use crate::actions::{ActionRegistry, Platform, SystemLauncher};
use crate::command::{CommandCategory, PatternClassifier};
use crate::config::Config;
use crate::events::SessionEvent;
use crate::lifecycle::ShutdownSignal;
use crate::session::{SessionContext, SessionStateMachine};
use crate::speech::{
    CommandRenderer, ConsoleRenderer, ConsoleSource, Renderer, ResponseSink, SerializedSink,
};

/// Wake-phrase driven voice command assistant
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory holding config.toml, preferences.json and .secrets
    #[arg(long, env = "ASSISTANT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// External text-to-speech program, overriding config.toml
    #[arg(long)]
    tts_command: Option<String>,

    /// Wake phrase for this run; repeat for several
    #[arg(long = "wake-phrase")]
    wake_phrases: Vec<String>,
}

/// Initialize logging to stderr and, when enabled, a log file
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let file_layer = if config.settings.log_to_file {
        let log_dir = config.log_dir();
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("failed to create {}", log_dir.display()))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("assistant.log"))
            .context("failed to open log file")?;
        Some(fmt::layer().with_ansi(false).with_writer(std::sync::Mutex::new(file)))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

/// Log session events as they are published
async fn log_events(mut event_rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match event_rx.recv().await {
            Ok(event) => {
                info!(%event, "session event");
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "session event receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config_dir.clone())?;
    config.ensure_dirs()?;
    init_logging(&args, &config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_dir = %config.config_dir.display(),
        "voice-assistant starting"
    );

    let settings = &config.settings;
    let preferences = config.load_preferences();
    let wake_override = (!args.wake_phrases.is_empty()).then(|| args.wake_phrases.clone());
    info!(
        wake_phrases = ?wake_override.as_ref().unwrap_or(&preferences.wake_words),
        city = %preferences.city,
        "preferences loaded"
    );

    // Capture and render devices; failing here is fatal
    let source = ConsoleSource::start().context("failed to initialize utterance source")?;
    let renderer: Arc<dyn Renderer> = match args.tts_command.as_ref().or(settings.tts_command.as_ref()) {
        Some(program) => Arc::new(
            CommandRenderer::new(program, settings.tts_args.clone(), &preferences)
                .context("failed to initialize speech renderer")?,
        ),
        None => Arc::new(ConsoleRenderer::new(settings.assistant_name.clone())),
    };
    let sink: Arc<dyn ResponseSink> = Arc::new(SerializedSink::new(renderer));

    // Handlers
    let platform = Platform::current();
    let mut registry = ActionRegistry::with_termination_phrases(&settings.termination_phrases);
    handlers::register_defaults(
        &mut registry,
        HandlerDeps {
            launcher: Arc::new(SystemLauncher::new(platform)),
            platform,
            api_keys: config.api_keys(),
            default_city: preferences.city.clone(),
            notes_dir: config.notes_dir(),
        },
    );
    for category in CommandCategory::ORDERED {
        if !registry.is_registered(category) {
            warn!(%category, "no handler registered, fallback will answer");
        }
    }

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();
    shutdown.listen();

    let (event_tx, event_rx) = broadcast::channel::<SessionEvent>(64);
    let event_logger = tokio::spawn(log_events(event_rx));

    let classifier = PatternClassifier::new(settings.pattern_set());
    if classifier
        .patterns()
        .triggers(CommandCategory::System)
        .is_empty()
    {
        info!("no system command triggers configured");
    }

    let ctx = SessionContext {
        assistant_name: settings.assistant_name.clone(),
        preferences,
        wake_phrases: wake_override,
        preferences_path: Some(config.preferences_path()),
        listen: settings.listen.clone(),
        source: Box::new(source),
        sink,
        classifier,
        registry,
        interrupt: shutdown.interrupt(),
    };

    let mut machine = SessionStateMachine::new(ctx, event_tx);

    info!("assistant initialized, entering session");
    machine.run().await;

    // Dropping the machine closes the event channel
    drop(machine);
    if let Err(e) = event_logger.await {
        error!(error = %e, "event logger failed");
    }

    info!("voice-assistant stopped");
    Ok(())
}
