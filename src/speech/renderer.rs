//! Text-to-speech engines

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{InitError, RenderError};
use crate::config::Preferences;

/// Engine that turns one piece of text into output
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), RenderError>;
}

/// Prints responses prefixed with the assistant's name
pub struct ConsoleRenderer {
    speaker: String,
}

impl ConsoleRenderer {
    pub fn new(speaker: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
        }
    }

    fn line(&self, text: &str) -> String {
        format!("{}: {}", self.speaker, text)
    }
}

#[async_trait]
impl Renderer for ConsoleRenderer {
    async fn speak(&self, text: &str) -> Result<(), RenderError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", self.line(text))?;
        stdout.flush()?;
        Ok(())
    }
}

/// Speaks through an external program such as `say` or `espeak`
pub struct CommandRenderer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandRenderer {
    /// Resolve `program` on the PATH
    ///
    /// When `args` is empty, rate and volume flags are derived from the
    /// preferences for the synthesizers that are known to take them.
    pub fn new(program: &str, args: Vec<String>, preferences: &Preferences) -> Result<Self, InitError> {
        let resolved = which::which(program)
            .map_err(|e| InitError::RendererUnavailable(format!("{program}: {e}")))?;

        let args = if args.is_empty() {
            tuning_args(&resolved, preferences)
        } else {
            args
        };

        debug!(program = %resolved.display(), ?args, "speech renderer resolved");
        Ok(Self {
            program: resolved,
            args,
        })
    }
}

fn tuning_args(program: &Path, preferences: &Preferences) -> Vec<String> {
    let name = program
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    match name {
        "say" => vec!["-r".to_string(), preferences.speech_rate.to_string()],
        "espeak" | "espeak-ng" => {
            let amplitude = (preferences.volume.clamp(0.0, 1.0) * 200.0).round() as u32;
            vec![
                "-s".to_string(),
                preferences.speech_rate.to_string(),
                "-a".to_string(),
                amplitude.to_string(),
                "-v".to_string(),
                preferences.language.to_lowercase(),
            ]
        }
        _ => Vec::new(),
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    async fn speak(&self, text: &str) -> Result<(), RenderError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(RenderError::Exit(status))
        }
    }
}
