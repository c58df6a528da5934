//! Events published by the session state machine
//!
//! Observers subscribe to a broadcast channel; nothing in the session waits
//! on them.

use serde::{Deserialize, Serialize};

use crate::command::CommandCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Greeting rendered, now waiting for the wake phrase
    SessionStarted,

    /// A captured utterance contained a wake phrase
    WakeDetected {
        phrase: String,
    },

    /// No command followed the wake phrase in time
    CommandTimedOut,

    /// A command was classified and dispatched
    CommandHandled {
        category: CommandCategory,
        continue_session: bool,
        /// Time from capture to dispatch result in milliseconds
        duration_ms: u64,
    },

    /// An interrupt signal cut the session short
    Interrupted,

    /// The session reached its terminal state
    SessionEnded {
        /// Commands processed over the session
        commands: usize,
    },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::SessionStarted => write!(f, "SESSION_STARTED"),
            SessionEvent::WakeDetected { phrase } => write!(f, "WAKE_DETECTED ({})", phrase),
            SessionEvent::CommandTimedOut => write!(f, "COMMAND_TIMED_OUT"),
            SessionEvent::CommandHandled {
                category,
                continue_session,
                duration_ms,
            } => write!(
                f,
                "COMMAND_HANDLED ({}, continue={}, {}ms)",
                category, continue_session, duration_ms
            ),
            SessionEvent::Interrupted => write!(f, "INTERRUPTED"),
            SessionEvent::SessionEnded { commands } => {
                write!(f, "SESSION_ENDED ({} commands)", commands)
            }
        }
    }
}
