//! Typed input standing in for speech recognition
//!
//! A dedicated thread blocks on stdin and forwards each line over a channel,
//! so capture can wait on it with a timeout from async code.

use std::io::BufRead;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{InitError, UtteranceSource};

/// Utterance source reading one line of stdin per utterance
pub struct ConsoleSource {
    line_rx: mpsc::Receiver<String>,
    closed: bool,
}

impl ConsoleSource {
    /// Start the stdin reader thread
    pub fn start() -> Result<Self, InitError> {
        let (line_tx, line_rx) = mpsc::channel(16);

        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || read_lines(std::io::stdin().lock(), line_tx))
            .map_err(|e| InitError::SourceUnavailable(e.to_string()))?;

        info!("console input ready");
        Ok(Self::from_channel(line_rx))
    }

    fn from_channel(line_rx: mpsc::Receiver<String>) -> Self {
        Self {
            line_rx,
            closed: false,
        }
    }
}

fn read_lines(input: impl BufRead, line_tx: mpsc::Sender<String>) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                if line_tx.blocking_send(line).is_err() {
                    debug!("console source dropped, reader exiting");
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to read from stdin");
                return;
            }
        }
    }
    debug!("stdin reached end of input");
}

#[async_trait]
impl UtteranceSource for ConsoleSource {
    async fn capture(&mut self, timeout: Duration, _max_phrase: Duration) -> Option<String> {
        if self.closed {
            // Behave like silence so the session keeps its timing
            tokio::time::sleep(timeout).await;
            return None;
        }

        match tokio::time::timeout(timeout, self.line_rx.recv()).await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.to_string())
                }
            }
            Ok(None) => {
                warn!("console input closed");
                self.closed = true;
                None
            }
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_reader_forwards_lines() {
        let (tx, rx) = mpsc::channel(4);
        let input = std::io::Cursor::new("hey ron\n\n  what time is it  \n");
        let reader = std::thread::spawn(move || read_lines(input, tx));

        let mut source = ConsoleSource::from_channel(rx);
        assert_eq!(source.capture(SECOND, SECOND).await.as_deref(), Some("hey ron"));
        assert_eq!(source.capture(SECOND, SECOND).await, None);
        assert_eq!(
            source.capture(SECOND, SECOND).await.as_deref(),
            Some("what time is it")
        );

        reader.join().unwrap();
        assert_eq!(source.capture(SECOND, SECOND).await, None);
        assert!(source.closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_input() {
        let (_tx, rx) = mpsc::channel(1);
        let mut source = ConsoleSource::from_channel(rx);

        assert_eq!(source.capture(SECOND, SECOND).await, None);
        assert!(!source.closed);
    }
}
