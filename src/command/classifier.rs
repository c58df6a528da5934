//! First-match keyword classifier

use std::collections::BTreeMap;

use tracing::debug;

use super::CommandCategory;

/// Ordered trigger substrings per category
///
/// Iteration always follows [`CommandCategory::ORDERED`], never the order in
/// which triggers were added.
#[derive(Debug, Clone)]
pub struct PatternSet {
    triggers: BTreeMap<CommandCategory, Vec<String>>,
}

impl PatternSet {
    /// Pattern set holding only the built-in triggers
    pub fn builtin() -> Self {
        let triggers = CommandCategory::ORDERED
            .iter()
            .map(|&category| {
                let words = category
                    .default_triggers()
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                (category, words)
            })
            .collect();

        Self { triggers }
    }

    /// Append extra triggers to a category, after its built-in ones
    ///
    /// Triggers are lower-cased and trimmed; empty ones are dropped so they
    /// cannot match every utterance. `Unknown` never takes triggers.
    pub fn extend<I, S>(&mut self, category: CommandCategory, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if category == CommandCategory::Unknown {
            return;
        }

        let entry = self.triggers.entry(category).or_default();
        for trigger in extra {
            let trigger = trigger.as_ref().trim().to_lowercase();
            if !trigger.is_empty() && !entry.contains(&trigger) {
                entry.push(trigger);
            }
        }
    }

    /// Triggers for a category in evaluation order
    pub fn triggers(&self, category: CommandCategory) -> &[String] {
        self.triggers
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Maps utterances to command categories
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier {
    patterns: PatternSet,
}

impl PatternClassifier {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    /// Classify an utterance
    ///
    /// Returns the first category, in declared order, that has any trigger
    /// occurring anywhere in the lower-cased utterance, or `Unknown`.
    pub fn classify(&self, utterance: &str) -> CommandCategory {
        let normalized = utterance.trim().to_lowercase();
        if normalized.is_empty() {
            return CommandCategory::Unknown;
        }

        let category = CommandCategory::ORDERED
            .into_iter()
            .find(|&category| {
                self.patterns
                    .triggers(category)
                    .iter()
                    .any(|trigger| normalized.contains(trigger.as_str()))
            })
            .unwrap_or(CommandCategory::Unknown);

        debug!(utterance = %normalized, %category, "utterance classified");
        category
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }
}
