//! Everything a session needs, assembled once at startup

use std::path::PathBuf;
use std::sync::Arc;

use crate::actions::ActionRegistry;
use crate::command::PatternClassifier;
use crate::config::{ListenSettings, Preferences};
use crate::lifecycle::Interrupt;
use crate::speech::{ResponseSink, UtteranceSource};

/// Explicit collaborators and the preferences snapshot for one session
pub struct SessionContext {
    /// Name used in the greeting and farewell
    pub assistant_name: String,
    /// Read at session start and not reloaded
    pub preferences: Preferences,
    /// Wake phrases for this session only, used instead of the preferences'
    /// and never persisted
    pub wake_phrases: Option<Vec<String>>,
    /// Where to persist preferences on shutdown; `None` skips persistence
    pub preferences_path: Option<PathBuf>,
    pub listen: ListenSettings,
    pub source: Box<dyn UtteranceSource>,
    pub sink: Arc<dyn ResponseSink>,
    pub classifier: PatternClassifier,
    pub registry: ActionRegistry,
    pub interrupt: Interrupt,
}
