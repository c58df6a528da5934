use chrono::{DateTime, Local};

/// One captured utterance
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Text exactly as the source returned it
    pub raw: String,
    /// Lower-cased and trimmed text used for matching
    pub text: String,
    pub captured_at: DateTime<Local>,
}

impl Utterance {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let text = raw.trim().to_lowercase();
        Self {
            raw,
            text,
            captured_at: Local::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
