//! Append-only record of processed commands

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::command::CommandCategory;

/// One processed command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Local>,
    /// Utterance as captured, before normalization
    pub utterance: String,
    pub category: CommandCategory,
}

/// Commands processed during a session, oldest first
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many commands fell into each category
    pub fn category_counts(&self) -> BTreeMap<CommandCategory, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.iter() {
            *counts.entry(entry.category).or_insert(0) += 1;
        }
        counts
    }
}
