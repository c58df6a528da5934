//! Session state machine
//!
//! Drives one listening session through five states:
//! - Idle: constructed, not yet greeted
//! - AwaitingWake: polling for a wake phrase with short captures
//! - Activated: acknowledged, capturing one command
//! - Executing: classifying and dispatching the command
//! - ShuttingDown: terminal, entered on farewell or interrupt

mod context;
mod machine;

pub use context::SessionContext;
pub use machine::{SessionState, SessionStateMachine};
