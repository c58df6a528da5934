//! Core state machine implementation
//!
//! Handles transitions between Idle, AwaitingWake, Activated, Executing and
//! ShuttingDown. Exactly one command is in flight at a time.

use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::{normalize_wake_words, CaptureLimits};
use crate::command::Utterance;
use crate::events::SessionEvent;
use crate::history::{HistoryEntry, HistoryLog};

use super::SessionContext;

const ACKNOWLEDGEMENT: &str = "Yes, how can I help you?";
const NOTHING_HEARD: &str = "I didn't hear anything. Please try again.";

/// The five states of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Constructed, not yet started
    #[default]
    Idle,
    /// Listening for a wake phrase
    AwaitingWake,
    /// Woken, capturing a command
    Activated,
    /// Classifying and dispatching the captured command
    Executing,
    /// Terminal
    ShuttingDown,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::AwaitingWake => write!(f, "AwaitingWake"),
            SessionState::Activated => write!(f, "Activated"),
            SessionState::Executing => write!(f, "Executing"),
            SessionState::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

/// Owns the session state and drives the listen/activate/execute cycle
pub struct SessionStateMachine {
    /// Current state
    state: SessionState,
    /// Cleared once shutdown has completed
    running: bool,
    ctx: SessionContext,
    history: HistoryLog,
    /// Command captured in Activated, consumed by Executing
    pending: Option<Utterance>,
    /// Normalized wake phrases, from the override or the preferences snapshot
    wake_phrases: Vec<String>,
    /// Time when the current state was entered
    state_entered_at: Instant,
    /// Channel for emitting session events
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionStateMachine {
    pub fn new(ctx: SessionContext, event_tx: broadcast::Sender<SessionEvent>) -> Self {
        let wake_phrases = match &ctx.wake_phrases {
            Some(phrases) => normalize_wake_words(phrases),
            None => ctx.preferences.normalized_wake_words(),
        };
        if wake_phrases.is_empty() {
            warn!("no wake phrases configured, the assistant cannot be activated");
        }

        Self {
            state: SessionState::Idle,
            running: false,
            ctx,
            history: HistoryLog::new(),
            pending: None,
            wake_phrases,
            state_entered_at: Instant::now(),
            event_tx,
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Started and not yet shut down
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Commands processed so far
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Run the session until it shuts down
    pub async fn run(&mut self) {
        self.start().await;
        while self.is_running() {
            self.step().await;
        }
        info!(
            commands = self.history().len(),
            state = %self.state(),
            "session finished"
        );
    }

    /// Greet the user and begin waiting for the wake phrase
    pub async fn start(&mut self) {
        if self.state != SessionState::Idle {
            return;
        }

        self.running = true;
        if self.ctx.interrupt.is_triggered() {
            self.interrupt();
            return;
        }

        let greeting = self.greeting();
        self.ctx.sink.render(&greeting, true).await;
        self.transition_to(SessionState::AwaitingWake);
        self.emit(SessionEvent::SessionStarted);
    }

    /// Do the work of the current state once
    pub async fn step(&mut self) {
        if self.state == SessionState::Idle {
            self.start().await;
            return;
        }
        if !self.running {
            return;
        }

        if self.state != SessionState::ShuttingDown && self.ctx.interrupt.is_triggered() {
            self.interrupt();
        }

        match self.state {
            SessionState::Idle => {}
            SessionState::AwaitingWake => self.await_wake().await,
            SessionState::Activated => self.listen_for_command().await,
            SessionState::Executing => self.execute().await,
            SessionState::ShuttingDown => self.shut_down().await,
        }
    }

    fn greeting(&self) -> String {
        let name = &self.ctx.assistant_name;
        match self.wake_phrases.first() {
            Some(phrase) => format!(
                "Hello! I'm {name}, your AI assistant. Say '{phrase}' to activate me."
            ),
            None => format!("Hello! I'm {name}, your AI assistant."),
        }
    }

    /// Abandon whatever was in progress and head for shutdown
    fn interrupt(&mut self) {
        warn!(state = %self.state, "interrupted");
        if self.pending.take().is_some() {
            debug!("discarding captured command");
        }
        self.emit(SessionEvent::Interrupted);
        self.transition_to(SessionState::ShuttingDown);
    }

    /// Capture one utterance, giving up early if an interrupt arrives
    async fn capture(&mut self, limits: CaptureLimits) -> Option<Utterance> {
        let mut interrupt = self.ctx.interrupt.clone();
        let captured = tokio::select! {
            text = self.ctx.source.capture(limits.timeout, limits.max_phrase) => text,
            _ = interrupt.triggered() => None,
        };

        captured
            .map(Utterance::new)
            .filter(|utterance| !utterance.is_empty())
    }

    fn match_wake_phrase(&self, utterance: &Utterance) -> Option<&str> {
        self.wake_phrases
            .iter()
            .find(|phrase| utterance.text.contains(phrase.as_str()))
            .map(String::as_str)
    }

    async fn await_wake(&mut self) {
        let limits = self.ctx.listen.wake();
        if let Some(utterance) = self.capture(limits).await {
            if let Some(phrase) = self.match_wake_phrase(&utterance) {
                let phrase = phrase.to_string();
                info!(%phrase, "wake phrase detected");
                self.emit(SessionEvent::WakeDetected { phrase });
                self.transition_to(SessionState::Activated);
                return;
            }
            debug!(utterance = %utterance.text, "ignoring speech without wake phrase");
        }

        tokio::time::sleep(self.ctx.listen.poll_interval()).await;
    }

    async fn listen_for_command(&mut self) {
        self.ctx.sink.render(ACKNOWLEDGEMENT, false).await;

        let limits = self.ctx.listen.command();
        match self.capture(limits).await {
            Some(utterance) => {
                info!(utterance = %utterance.text, "command captured");
                self.pending = Some(utterance);
                self.transition_to(SessionState::Executing);
            }
            None if self.ctx.interrupt.is_triggered() => {
                // Next step moves to ShuttingDown
            }
            None => {
                info!("no command heard");
                self.ctx.sink.render(NOTHING_HEARD, true).await;
                self.emit(SessionEvent::CommandTimedOut);
                self.transition_to(SessionState::AwaitingWake);
            }
        }
    }

    async fn execute(&mut self) {
        let Some(utterance) = self.pending.take() else {
            warn!("executing without a captured command");
            self.transition_to(SessionState::AwaitingWake);
            return;
        };
        let started = Instant::now();

        // Termination phrases are checked before classification
        let farewell = self.ctx.registry.intercept_termination(&utterance.text);
        let category = self.ctx.classifier.classify(&utterance.text);

        self.history.append(HistoryEntry {
            timestamp: utterance.captured_at,
            utterance: utterance.raw.clone(),
            category,
        });

        let result = match farewell {
            Some(result) => result,
            None => self.ctx.registry.dispatch(category, &utterance.text).await,
        };

        if let Some(response) = &result.response {
            self.ctx.sink.render(response, true).await;
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            %category,
            continue_session = result.continue_session,
            duration_ms,
            "command handled"
        );
        self.emit(SessionEvent::CommandHandled {
            category,
            continue_session: result.continue_session,
            duration_ms,
        });

        if result.continue_session {
            self.transition_to(SessionState::AwaitingWake);
        } else {
            self.transition_to(SessionState::ShuttingDown);
        }
    }

    async fn shut_down(&mut self) {
        info!("shutting down session");

        if let Some(path) = &self.ctx.preferences_path {
            if let Err(e) = self.ctx.preferences.save(path) {
                error!(error = %e, "failed to save preferences");
            }
        }

        let farewell = format!("{} shutting down. Goodbye!", self.ctx.assistant_name);
        self.ctx.sink.render(&farewell, true).await;
        self.ctx.sink.flush().await;

        info!(
            commands = self.history.len(),
            by_category = ?self.history.category_counts(),
            "session summary"
        );
        self.emit(SessionEvent::SessionEnded {
            commands: self.history.len(),
        });
        self.running = false;
    }

    /// Perform a state transition
    fn transition_to(&mut self, new_state: SessionState) {
        let old_state = self.state;
        if old_state == new_state {
            return;
        }

        let duration_ms = self.state_entered_at.elapsed().as_millis() as u64;
        info!(
            from = %old_state,
            to = %new_state,
            duration_ms = duration_ms,
            "state transition"
        );

        self.state = new_state;
        self.state_entered_at = Instant::now();
    }

    fn emit(&self, event: SessionEvent) {
        debug!(%event, "emitting session event");
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::actions::handlers::TimeHandler;
    use crate::actions::{ActionHandler, ActionRegistry, DispatchResult, HandlerError};
    use crate::command::{CommandCategory, PatternClassifier};
    use crate::config::{ListenSettings, Preferences};
    use crate::lifecycle::{Interrupt, ShutdownSignal};
    use crate::speech::testing::{RecordingSink, ScriptedSource};

    struct Echo;

    #[async_trait]
    impl ActionHandler for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
            Ok(DispatchResult::reply(format!("echo: {utterance}")))
        }
    }

    struct Broken;

    #[async_trait]
    impl ActionHandler for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn handle(&self, _utterance: &str) -> Result<DispatchResult, HandlerError> {
            Err(HandlerError::Io(std::io::Error::other("no network")))
        }
    }

    struct Harness {
        machine: SessionStateMachine,
        sink: Arc<RecordingSink>,
        events: broadcast::Receiver<SessionEvent>,
    }

    fn harness_with(
        script: Vec<Option<&'static str>>,
        registry: ActionRegistry,
        interrupt: Interrupt,
    ) -> Harness {
        harness_from(ScriptedSource::new(script), registry, interrupt)
    }

    fn harness_from(
        source: ScriptedSource,
        registry: ActionRegistry,
        interrupt: Interrupt,
    ) -> Harness {
        let sink = Arc::new(RecordingSink::default());
        let ctx = SessionContext {
            assistant_name: "Ron".to_string(),
            preferences: Preferences::default(),
            wake_phrases: None,
            preferences_path: None,
            listen: ListenSettings::default(),
            source: Box::new(source),
            sink: sink.clone(),
            classifier: PatternClassifier::default(),
            registry,
            interrupt,
        };
        let (event_tx, events) = broadcast::channel(64);

        Harness {
            machine: SessionStateMachine::new(ctx, event_tx),
            sink,
            events,
        }
    }

    fn harness(script: Vec<Option<&'static str>>) -> Harness {
        let mut registry = ActionRegistry::new();
        registry.register(CommandCategory::Time, Arc::new(TimeHandler));
        registry.register(CommandCategory::Search, Arc::new(Echo));
        harness_with(script, registry, Interrupt::never())
    }

    fn drain(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn test_initial_state() {
        let h = harness(vec![]);
        assert_eq!(h.machine.state(), SessionState::Idle);
        assert!(!h.machine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_greets_and_awaits_wake() {
        let mut h = harness(vec![]);
        h.machine.start().await;

        assert_eq!(h.machine.state(), SessionState::AwaitingWake);
        assert_eq!(
            h.sink.texts(),
            vec!["Hello! I'm Ron, your AI assistant. Say 'hey ron' to activate me."]
        );
        assert!(matches!(
            drain(&mut h.events).as_slice(),
            [SessionEvent::SessionStarted]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_from_idle_starts_session() {
        let mut h = harness(vec![]);
        h.machine.step().await;

        assert!(h.machine.is_running());
        assert_eq!(h.machine.state(), SessionState::AwaitingWake);
        assert_eq!(h.sink.texts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_keep_awaiting_wake() {
        let mut h = harness(vec![None, None]);
        h.machine.start().await;
        let greeted = h.sink.texts().len();

        h.machine.step().await;
        h.machine.step().await;

        assert_eq!(h.machine.state(), SessionState::AwaitingWake);
        assert_eq!(h.sink.texts().len(), greeted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speech_without_wake_phrase_is_ignored() {
        let mut h = harness(vec![Some("what time is it")]);
        h.machine.start().await;
        h.machine.step().await;

        assert_eq!(h.machine.state(), SessionState::AwaitingWake);
        assert!(h.machine.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wake_phrase_matches_as_substring() {
        let mut h = harness(vec![Some("Well, HEY RON are you there")]);
        h.machine.start().await;
        h.machine.step().await;

        assert_eq!(h.machine.state(), SessionState::Activated);
        let events = drain(&mut h.events);
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::WakeDetected { phrase } if phrase == "hey ron")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_activated_timeout_reports_nothing_heard() {
        let mut h = harness(vec![Some("hey ron"), None]);
        h.machine.start().await;
        h.machine.step().await;
        h.machine.step().await;

        assert_eq!(h.machine.state(), SessionState::AwaitingWake);
        let texts = h.sink.texts();
        assert_eq!(texts.iter().filter(|t| *t == NOTHING_HEARD).count(), 1);
        assert_eq!(texts.last().map(String::as_str), Some(NOTHING_HEARD));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acknowledgement_is_non_blocking() {
        let mut h = harness(vec![Some("hey ron"), Some("what time is it")]);
        h.machine.start().await;
        h.machine.step().await;
        h.machine.step().await;

        assert_eq!(h.machine.state(), SessionState::Executing);
        assert!(h
            .sink
            .renders()
            .contains(&(ACKNOWLEDGEMENT.to_string(), false)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_command_cycle() {
        let mut h = harness(vec![Some("hey ron"), Some("What time is it")]);
        h.machine.start().await;
        for _ in 0..3 {
            h.machine.step().await;
        }

        assert_eq!(h.machine.state(), SessionState::AwaitingWake);
        let response = h.sink.texts().last().cloned().unwrap();
        assert!(response.starts_with("It's "));

        let entry = h.machine.history().iter().last().unwrap();
        assert_eq!(entry.category, CommandCategory::Time);
        assert_eq!(entry.utterance, "What time is it");
    }

    #[tokio::test(start_paused = true)]
    async fn test_goodbye_shuts_down() {
        let mut h = harness(vec![Some("hey ron"), Some("search the weather and goodbye")]);
        h.machine.run().await;

        assert_eq!(h.machine.state(), SessionState::ShuttingDown);
        assert!(!h.machine.is_running());

        let texts = h.sink.texts();
        assert!(texts.contains(&"Goodbye! It was nice talking to you.".to_string()));
        assert_eq!(
            texts.last().map(String::as_str),
            Some("Ron shutting down. Goodbye!")
        );
        assert!(!texts.iter().any(|t| t.starts_with("echo:")));

        // Still recorded with its classified category
        assert_eq!(h.machine.history().len(), 1);
        assert_eq!(
            h.machine.history().iter().last().unwrap().category,
            CommandCategory::Weather
        );

        let events = drain(&mut h.events);
        assert!(matches!(
            events.last(),
            Some(SessionEvent::SessionEnded { commands: 1 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_handler_keeps_session_alive() {
        let mut registry = ActionRegistry::new();
        registry.register(CommandCategory::Weather, Arc::new(Broken));
        let mut h = harness_with(
            vec![Some("hey ron"), Some("weather please")],
            registry,
            Interrupt::never(),
        );

        h.machine.start().await;
        for _ in 0..3 {
            h.machine.step().await;
        }

        assert_eq!(h.machine.state(), SessionState::AwaitingWake);
        assert!(h.machine.is_running());
        assert!(h.sink.texts().last().unwrap().starts_with("Sorry"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_in_any_state_shuts_down() {
        let shutdown = ShutdownSignal::new();
        let mut h = harness_with(
            vec![Some("hey ron"), Some("what time is it")],
            ActionRegistry::new(),
            shutdown.interrupt(),
        );

        h.machine.start().await;
        h.machine.step().await;
        h.machine.step().await;
        assert_eq!(h.machine.state(), SessionState::Executing);

        shutdown.trigger();
        h.machine.step().await;

        assert_eq!(h.machine.state(), SessionState::ShuttingDown);
        assert!(!h.machine.is_running());
        // The captured command was dropped, not executed
        assert!(h.machine.history().is_empty());
        assert_eq!(
            h.sink.texts().last().map(String::as_str),
            Some("Ron shutting down. Goodbye!")
        );

        let events = drain(&mut h.events);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::Interrupted)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_before_start_skips_greeting() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        let mut h = harness_with(vec![], ActionRegistry::new(), shutdown.interrupt());

        h.machine.run().await;

        assert_eq!(h.machine.state(), SessionState::ShuttingDown);
        assert_eq!(h.sink.texts(), vec!["Ron shutting down. Goodbye!"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_after_shutdown_is_noop() {
        let mut h = harness(vec![Some("hey ron"), Some("bye")]);
        h.machine.run().await;
        let rendered = h.sink.texts().len();

        h.machine.step().await;
        assert_eq!(h.sink.texts().len(), rendered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preferences_saved_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let mut h = harness(vec![Some("hey ron"), Some("quit")]);
        h.machine.ctx.preferences_path = Some(path.clone());

        h.machine.run().await;

        assert_eq!(Preferences::load_or_default(&path), Preferences::default());
        assert!(path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wake_override_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let mut h = harness(vec![Some("computer"), Some("bye")]);
        h.machine.ctx.preferences_path = Some(path.clone());
        h.machine.wake_phrases = normalize_wake_words(&["Computer".to_string()]);

        h.machine.run().await;

        // Woken by the override, then the farewell path ran
        assert!(h
            .sink
            .texts()
            .contains(&"Goodbye! It was nice talking to you.".to_string()));
        assert_eq!(
            Preferences::load_or_default(&path).wake_words,
            Preferences::default().wake_words
        );
    }

    #[test]
    fn test_wake_override_replaces_preference_phrases() {
        let sink = Arc::new(RecordingSink::default());
        let ctx = SessionContext {
            assistant_name: "Ron".to_string(),
            preferences: Preferences::default(),
            wake_phrases: Some(vec!["  Jarvis ".to_string(), String::new()]),
            preferences_path: None,
            listen: ListenSettings::default(),
            source: Box::new(ScriptedSource::new(vec![])),
            sink,
            classifier: PatternClassifier::default(),
            registry: ActionRegistry::new(),
            interrupt: Interrupt::never(),
        };
        let (event_tx, _events) = broadcast::channel(4);

        let machine = SessionStateMachine::new(ctx, event_tx);
        assert_eq!(machine.wake_phrases, vec!["jarvis"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_while_awaiting_wake_capture() {
        let shutdown = ShutdownSignal::new();
        let mut h = harness_from(
            ScriptedSource::new(vec![]).then_hang(),
            ActionRegistry::new(),
            shutdown.interrupt(),
        );
        h.machine.start().await;

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            shutdown.trigger();
        });
        h.machine.step().await;
        assert_eq!(h.machine.state(), SessionState::AwaitingWake);

        h.machine.step().await;
        assert_eq!(h.machine.state(), SessionState::ShuttingDown);
        assert!(!h.machine.is_running());

        let events = drain(&mut h.events);
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::WakeDetected { .. })));
        assert!(events.iter().any(|e| matches!(e, SessionEvent::Interrupted)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_while_capturing_command() {
        let shutdown = ShutdownSignal::new();
        let mut h = harness_from(
            ScriptedSource::new(vec![Some("hey ron")]).then_hang(),
            ActionRegistry::new(),
            shutdown.interrupt(),
        );
        h.machine.start().await;
        h.machine.step().await;
        assert_eq!(h.machine.state(), SessionState::Activated);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            shutdown.trigger();
        });
        h.machine.step().await;

        // Capture was abandoned without reporting a timeout
        assert_eq!(h.machine.state(), SessionState::Activated);
        assert!(!h.sink.texts().iter().any(|t| t == NOTHING_HEARD));
        assert!(!drain(&mut h.events)
            .iter()
            .any(|e| matches!(e, SessionEvent::CommandTimedOut)));

        h.machine.step().await;
        assert_eq!(h.machine.state(), SessionState::ShuttingDown);
        assert!(!h.machine.is_running());
        assert!(h.machine.history().is_empty());
        assert_eq!(
            h.sink.texts().last().map(String::as_str),
            Some("Ron shutting down. Goodbye!")
        );
    }
}
