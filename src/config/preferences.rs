//! User preferences persisted as JSON

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Per-user settings read once when a session starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// How the assistant addresses the user
    pub name: String,
    /// Default city for weather lookups
    pub city: String,
    /// Index of the preferred synthesizer voice
    pub preferred_voice: u32,
    /// Speech rate in words per minute
    pub speech_rate: u32,
    /// Output volume, 0.0 to 1.0
    pub volume: f32,
    /// Recognition locale
    pub language: String,
    /// Phrases that activate the assistant
    pub wake_words: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            name: "User".to_string(),
            city: "New York".to_string(),
            preferred_voice: 0,
            speech_rate: 180,
            volume: 0.8,
            language: "en-US".to_string(),
            wake_words: vec![
                "hey ron".to_string(),
                "ron".to_string(),
                "hey assistant".to_string(),
            ],
        }
    }
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file is absent or unreadable
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::read(path) {
            Ok(preferences) => preferences,
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load preferences");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let preferences = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(preferences)
    }

    /// Write preferences as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "preferences saved");
        Ok(())
    }

    pub fn normalized_wake_words(&self) -> Vec<String> {
        normalize_wake_words(&self.wake_words)
    }
}

/// Wake phrases lower-cased and trimmed, empty entries dropped
pub fn normalize_wake_words(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
