//! Action dispatch
//!
//! Each [`CommandCategory`](crate::command::CommandCategory) is served by one
//! [`ActionHandler`]. The [`ActionRegistry`] owns the lookup table, intercepts
//! termination phrases and turns handler failures into spoken apologies.

pub mod handlers;
mod launcher;
mod registry;

use async_trait::async_trait;
use serde::Serialize;

pub use launcher::{Launcher, Platform, SystemLauncher};
pub use registry::{ActionRegistry, DEFAULT_TERMINATION_PHRASES};

/// Outcome of dispatching one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    /// Text to speak back, if any
    pub response: Option<String>,
    /// Whether the session keeps listening after this command
    pub continue_session: bool,
}

impl DispatchResult {
    /// Speak `text` and keep the session alive
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            continue_session: true,
        }
    }

    /// Speak `text` and end the session
    pub fn terminate(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            continue_session: false,
        }
    }
}

/// Errors raised by action handlers
///
/// These never leave the registry; they are logged and replaced by an apology.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("failed to launch {target}: {reason}")]
    Launch { target: String, reason: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handles every command of one category
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Handle a normalized utterance
    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError>;
}
