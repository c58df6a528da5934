//! Dictated notes saved as text files

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Local;
use tracing::info;

use crate::actions::{ActionHandler, DispatchResult, HandlerError};

use super::extract_after;

const NOTE_TERMS: [&str; 3] = ["note that", "write down", "remember"];

pub struct NoteHandler {
    notes_dir: PathBuf,
}

impl NoteHandler {
    pub fn new(notes_dir: PathBuf) -> Self {
        Self { notes_dir }
    }
}

#[async_trait]
impl ActionHandler for NoteHandler {
    fn name(&self) -> &'static str {
        "note"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        let Some(note) = extract_after(utterance, &NOTE_TERMS) else {
            return Ok(DispatchResult::reply("What would you like me to note down?"));
        };

        tokio::fs::create_dir_all(&self.notes_dir).await?;

        let now = Local::now();
        let path = self
            .notes_dir
            .join(format!("note_{}.txt", now.format("%Y%m%d_%H%M%S")));
        let body = format!("Note created at {}\n{note}\n", now.format("%Y-%m-%d %H:%M:%S"));
        tokio::fs::write(&path, body).await?;

        info!(path = %path.display(), "note saved");
        Ok(DispatchResult::reply(format!("I've saved your note: {note}")))
    }
}
