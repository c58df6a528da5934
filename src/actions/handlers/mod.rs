//! Built-in action handlers, one per command category

mod apps;
mod clock;
mod fallback;
mod home;
mod note;
mod weather;
mod web;

use std::path::PathBuf;
use std::sync::Arc;

pub use apps::{OpenAppHandler, SystemHandler, VolumeHandler};
pub use clock::{DateHandler, TimeHandler};
pub use fallback::FallbackHandler;
pub use home::{ReminderHandler, SmartHomeHandler};
pub use note::NoteHandler;
pub use weather::WeatherHandler;
pub use web::{InfoHandler, MusicHandler, SearchHandler};

use crate::command::CommandCategory;
use crate::config::ApiKeys;

use super::{ActionRegistry, Launcher, Platform};

/// Everything the built-in handlers need from the outside world
#[derive(Clone)]
pub struct HandlerDeps {
    pub launcher: Arc<dyn Launcher>,
    pub platform: Platform,
    pub api_keys: ApiKeys,
    /// City used when a weather request names none
    pub default_city: String,
    pub notes_dir: PathBuf,
}

/// Register a handler for every category except `Unknown`
pub fn register_defaults(registry: &mut ActionRegistry, deps: HandlerDeps) {
    let HandlerDeps {
        launcher,
        platform,
        api_keys,
        default_city,
        notes_dir,
    } = deps;

    registry.register(CommandCategory::Time, Arc::new(TimeHandler));
    registry.register(CommandCategory::Date, Arc::new(DateHandler));
    registry.register(
        CommandCategory::Weather,
        Arc::new(WeatherHandler::new(api_keys, default_city)),
    );
    registry.register(
        CommandCategory::Search,
        Arc::new(SearchHandler::new(Arc::clone(&launcher))),
    );
    registry.register(
        CommandCategory::OpenApp,
        Arc::new(OpenAppHandler::new(Arc::clone(&launcher), platform)),
    );
    registry.register(CommandCategory::System, Arc::new(SystemHandler));
    registry.register(
        CommandCategory::Volume,
        Arc::new(VolumeHandler::new(Arc::clone(&launcher), platform)),
    );
    registry.register(
        CommandCategory::Music,
        Arc::new(MusicHandler::new(Arc::clone(&launcher))),
    );
    registry.register(CommandCategory::Info, Arc::new(InfoHandler::new(launcher)));
    registry.register(CommandCategory::SmartHome, Arc::new(SmartHomeHandler));
    registry.register(CommandCategory::Reminder, Arc::new(ReminderHandler));
    registry.register(CommandCategory::Note, Arc::new(NoteHandler::new(notes_dir)));
}

/// Text following the first listed term that occurs in the utterance
///
/// Terms are tried in order; the text after the term's last occurrence is
/// returned trimmed. `None` when no term occurs or nothing follows it.
pub fn extract_after(utterance: &str, terms: &[&str]) -> Option<String> {
    let lower = utterance.to_lowercase();
    let term = terms.iter().find(|term| lower.contains(*term))?;
    let (_, rest) = lower.rsplit_once(term)?;
    let rest = rest.trim();

    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}
