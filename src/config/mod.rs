//! Configuration loading and management
//!
//! Three sources feed the assistant:
//! - `config.toml`: optional overlay of assistant settings
//! - `preferences.json`: user preferences, saved again on shutdown
//! - `.secrets` plus `<SERVICE>_API_KEY` variables: API credentials

mod preferences;
mod secrets;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::command::{CommandCategory, PatternSet};

pub use preferences::{normalize_wake_words, Preferences};
pub use secrets::ApiKeys;

const APP_DIR: &str = "voice-assistant";

/// Resolved directories plus the parsed settings file
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding config.toml, preferences and secrets
    pub config_dir: PathBuf,

    /// Directory for notes and logs
    pub data_dir: PathBuf,

    /// Contents of config.toml
    pub settings: Settings,
}

/// Assistant settings from `config.toml`; every field is optional
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name the assistant uses for itself
    pub assistant_name: String,

    /// Phrases that end the session
    pub termination_phrases: Vec<String>,

    /// External text-to-speech program; console output when unset
    pub tts_command: Option<String>,

    /// Arguments placed before the spoken text
    pub tts_args: Vec<String>,

    /// Capture timing
    pub listen: ListenSettings,

    /// Extra trigger phrases keyed by category name (`open_app`, `note`, ...)
    pub patterns: BTreeMap<String, Vec<String>>,

    /// Write logs to `<data_dir>/logs/assistant.log` as well as stderr
    pub log_to_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assistant_name: "Ron".to_string(),
            termination_phrases: crate::actions::DEFAULT_TERMINATION_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            tts_command: None,
            tts_args: Vec::new(),
            listen: ListenSettings::default(),
            patterns: BTreeMap::new(),
            log_to_file: true,
        }
    }
}

impl Settings {
    /// Built-in patterns extended with the configured ones
    pub fn pattern_set(&self) -> PatternSet {
        let mut patterns = PatternSet::builtin();
        for (name, extra) in &self.patterns {
            match name.parse::<CommandCategory>() {
                Ok(category) => patterns.extend(category, extra),
                Err(e) => warn!(error = %e, "ignoring configured patterns"),
            }
        }
        patterns
    }
}

/// Timeouts for the two kinds of capture, in seconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenSettings {
    pub wake_timeout_secs: f64,
    pub wake_phrase_limit_secs: f64,
    pub command_timeout_secs: f64,
    pub command_phrase_limit_secs: f64,
    /// Pause between wake-phrase polls, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            wake_timeout_secs: 1.0,
            wake_phrase_limit_secs: 3.0,
            command_timeout_secs: 5.0,
            command_phrase_limit_secs: 10.0,
            poll_interval_ms: 100,
        }
    }
}

/// Capture bounds for one listen request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureLimits {
    pub timeout: Duration,
    pub max_phrase: Duration,
}

impl ListenSettings {
    pub fn wake(&self) -> CaptureLimits {
        CaptureLimits {
            timeout: secs(self.wake_timeout_secs),
            max_phrase: secs(self.wake_phrase_limit_secs),
        }
    }

    pub fn command(&self) -> CaptureLimits {
        CaptureLimits {
            timeout: secs(self.command_timeout_secs),
            max_phrase: secs(self.command_phrase_limit_secs),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl Config {
    /// Load configuration from an explicit directory or the platform default
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => dirs::config_dir()
                .context("no config directory available on this platform")?
                .join(APP_DIR),
        };
        let data_dir = dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| config_dir.join("data"));

        Self::with_dirs(config_dir, data_dir)
    }

    /// Load configuration rooted at the given directories
    pub fn with_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Result<Self> {
        let settings = Self::read_settings(&config_dir.join("config.toml"))?;

        Ok(Self {
            config_dir,
            data_dir,
            settings,
        })
    }

    fn read_settings(path: &Path) -> Result<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(settings)
    }

    /// Ensure config and data directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)
            .with_context(|| format!("failed to create {}", self.config_dir.display()))?;
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir.join("preferences.json")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.config_dir.join(".secrets")
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.data_dir.join("notes")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn load_preferences(&self) -> Preferences {
        Preferences::load_or_default(&self.preferences_path())
    }

    pub fn api_keys(&self) -> ApiKeys {
        let path = self.secrets_path();
        if path.exists() {
            ApiKeys::new(path)
        } else {
            ApiKeys::env_only()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            Config::with_dirs(dir.path().join("config"), dir.path().join("data")).unwrap();

        assert_eq!(config.settings.assistant_name, "Ron");
        assert_eq!(config.settings.termination_phrases.len(), 4);
        assert!(config.preferences_path().ends_with("preferences.json"));
        assert!(config.notes_dir().starts_with(dir.path().join("data")));
    }

    #[test]
    fn test_config_file_overlay() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
assistant_name = "Jarvis"
termination_phrases = ["stop listening"]

[listen]
command_timeout_secs = 30.0

[patterns]
system = ["shutdown computer"]
note = ["jot down"]
bogus = ["ignored"]
"#,
        )
        .unwrap();

        let config = Config::with_dirs(dir.path().to_path_buf(), dir.path().join("data")).unwrap();
        let settings = &config.settings;

        assert_eq!(settings.assistant_name, "Jarvis");
        assert_eq!(settings.termination_phrases, vec!["stop listening"]);
        assert_eq!(settings.listen.command().timeout, Duration::from_secs(30));
        assert_eq!(settings.listen.wake().timeout, Duration::from_secs(1));

        let patterns = settings.pattern_set();
        assert_eq!(patterns.triggers(CommandCategory::System), ["shutdown computer"]);
        assert!(patterns
            .triggers(CommandCategory::Note)
            .contains(&"jot down".to_string()));
    }

    #[test]
    fn test_invalid_config_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "assistant_name = [").unwrap();

        assert!(Config::with_dirs(dir.path().to_path_buf(), dir.path().join("data")).is_err());
    }

    #[test]
    fn test_negative_timeout_clamps_to_zero() {
        let listen = ListenSettings {
            wake_timeout_secs: -1.0,
            ..ListenSettings::default()
        };
        assert_eq!(listen.wake().timeout, Duration::ZERO);
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            Config::with_dirs(dir.path().join("a"), dir.path().join("b")).unwrap();
        config.ensure_dirs().unwrap();
        assert!(config.config_dir.is_dir());
        assert!(config.data_dir.is_dir());
    }
}
