//! Command categories recognized by the classifier

use serde::{Deserialize, Serialize};

/// Every kind of command the assistant knows how to route
///
/// The declaration order is the classification order: when an utterance
/// carries triggers for several categories, the one declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    Time,
    Date,
    Weather,
    Search,
    OpenApp,
    System,
    Volume,
    Music,
    Info,
    SmartHome,
    Reminder,
    Note,
    /// Nothing matched
    Unknown,
}

impl CommandCategory {
    /// All categories that carry trigger patterns, in classification order
    pub const ORDERED: [CommandCategory; 12] = [
        CommandCategory::Time,
        CommandCategory::Date,
        CommandCategory::Weather,
        CommandCategory::Search,
        CommandCategory::OpenApp,
        CommandCategory::System,
        CommandCategory::Volume,
        CommandCategory::Music,
        CommandCategory::Info,
        CommandCategory::SmartHome,
        CommandCategory::Reminder,
        CommandCategory::Note,
    ];

    /// Built-in trigger substrings for this category
    pub fn default_triggers(self) -> &'static [&'static str] {
        match self {
            CommandCategory::Time => &["time", "clock", "what time"],
            CommandCategory::Date => &["date", "day", "what day"],
            CommandCategory::Weather => &["weather", "temperature", "forecast"],
            CommandCategory::Search => &["search", "google", "look up", "find"],
            CommandCategory::OpenApp => &["open", "launch", "start"],
            CommandCategory::System => &[],
            CommandCategory::Volume => &["volume", "sound", "mute", "unmute"],
            CommandCategory::Music => &["play music", "pause music", "stop music", "next song"],
            CommandCategory::Info => &["tell me about", "what is", "who is", "define"],
            CommandCategory::SmartHome => &["lights", "temperature", "thermostat", "lock", "unlock"],
            CommandCategory::Reminder => &["remind", "reminder", "alert me"],
            CommandCategory::Note => &["note", "write down", "remember this"],
            CommandCategory::Unknown => &[],
        }
    }
}

impl std::fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommandCategory::Time => "time",
            CommandCategory::Date => "date",
            CommandCategory::Weather => "weather",
            CommandCategory::Search => "search",
            CommandCategory::OpenApp => "open_app",
            CommandCategory::System => "system",
            CommandCategory::Volume => "volume",
            CommandCategory::Music => "music",
            CommandCategory::Info => "info",
            CommandCategory::SmartHome => "smart_home",
            CommandCategory::Reminder => "reminder",
            CommandCategory::Note => "note",
            CommandCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Returned when a category name is not recognized
#[derive(Debug, thiserror::Error)]
#[error("unknown command category: {0}")]
pub struct UnknownCategory(String);

impl std::str::FromStr for CommandCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        CommandCategory::ORDERED
            .into_iter()
            .chain([CommandCategory::Unknown])
            .find(|category| category.to_string() == name)
            .ok_or(UnknownCategory(name))
    }
}
