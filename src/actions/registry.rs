//! Category to handler lookup with failure isolation

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::command::CommandCategory;

use super::handlers::FallbackHandler;
use super::{ActionHandler, DispatchResult};

/// Phrases that end the session, whatever else the utterance says
pub const DEFAULT_TERMINATION_PHRASES: [&str; 4] = ["goodbye", "exit", "quit", "bye"];

const FAREWELL: &str = "Goodbye! It was nice talking to you.";
const APOLOGY: &str = "Sorry, I encountered an error processing that command.";

/// Routes classified commands to their handlers
pub struct ActionRegistry {
    handlers: HashMap<CommandCategory, Arc<dyn ActionHandler>>,
    fallback: Arc<dyn ActionHandler>,
    termination_phrases: Vec<String>,
}

impl ActionRegistry {
    /// Empty registry using the default termination phrases
    pub fn new() -> Self {
        Self::with_termination_phrases(DEFAULT_TERMINATION_PHRASES)
    }

    /// Empty registry with a custom termination phrase set
    pub fn with_termination_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let termination_phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            handlers: HashMap::new(),
            fallback: Arc::new(FallbackHandler),
            termination_phrases,
        }
    }

    /// Register a handler, replacing any previous one for the category
    pub fn register(&mut self, category: CommandCategory, handler: Arc<dyn ActionHandler>) {
        if let Some(previous) = self.handlers.insert(category, Arc::clone(&handler)) {
            info!(
                %category,
                previous = previous.name(),
                handler = handler.name(),
                "handler replaced"
            );
        } else {
            debug!(%category, handler = handler.name(), "handler registered");
        }
    }

    /// Whether a handler other than the fallback serves this category
    pub fn is_registered(&self, category: CommandCategory) -> bool {
        self.handlers.contains_key(&category)
    }

    /// Farewell result if the utterance contains a termination phrase
    pub fn intercept_termination(&self, utterance: &str) -> Option<DispatchResult> {
        let normalized = utterance.to_lowercase();
        let phrase = self
            .termination_phrases
            .iter()
            .find(|phrase| normalized.contains(phrase.as_str()))?;

        info!(%phrase, "termination phrase detected");
        Some(DispatchResult::terminate(FAREWELL))
    }

    /// Dispatch a command to its handler
    ///
    /// Termination phrases are honored before the category is looked at.
    /// Handler errors and panics are logged and answered with an apology;
    /// they never end the session.
    pub async fn dispatch(&self, category: CommandCategory, utterance: &str) -> DispatchResult {
        if let Some(farewell) = self.intercept_termination(utterance) {
            return farewell;
        }

        let handler = self
            .handlers
            .get(&category)
            .map(Arc::clone)
            .unwrap_or_else(|| Arc::clone(&self.fallback));
        let name = handler.name();

        debug!(%category, handler = name, "dispatching command");

        // Run on its own task so a panicking handler cannot unwind the session
        let owned = utterance.to_owned();
        let outcome = tokio::spawn(async move { handler.handle(&owned).await }).await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!(%category, handler = name, error = %e, ?e, "handler failed");
                DispatchResult::reply(APOLOGY)
            }
            Err(join_error) => {
                error!(%category, handler = name, error = %join_error, "handler aborted");
                DispatchResult::reply(APOLOGY)
            }
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
