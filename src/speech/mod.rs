//! Capture and render boundaries
//!
//! Speech recognition and synthesis engines sit behind two traits:
//! - [`UtteranceSource`]: produces transcribed text, or nothing on silence
//! - [`ResponseSink`]: speaks text back, serializing overlapping renders
//!
//! The implementations here are text-mode: lines typed on stdin stand in for
//! recognized speech, and responses go to stdout or an external TTS program.

mod console;
mod renderer;
mod sink;

use std::time::Duration;

use async_trait::async_trait;

pub use console::ConsoleSource;
pub use renderer::{CommandRenderer, ConsoleRenderer, Renderer};
pub use sink::SerializedSink;

/// Source of transcribed utterances
#[async_trait]
pub trait UtteranceSource: Send {
    /// Wait up to `timeout` for speech to start and return its transcription
    ///
    /// Returns `None` on silence or unintelligible input; neither is an error.
    async fn capture(&mut self, timeout: Duration, max_phrase: Duration) -> Option<String>;
}

/// Destination for spoken responses
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Speak `text`; when `blocking` is false return before playback ends
    async fn render(&self, text: &str, blocking: bool);

    /// Wait for every render started so far to finish
    async fn flush(&self) {}
}

/// Startup failures that leave the assistant unable to listen or speak
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("utterance source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("speech renderer unavailable: {0}")]
    RendererUnavailable(String),
}

/// Failure while speaking a single response
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("renderer exited with {0}")]
    Exit(std::process::ExitStatus),
}
