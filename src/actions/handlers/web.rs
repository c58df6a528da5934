//! Handlers that answer by opening a page in the browser

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::actions::{ActionHandler, DispatchResult, HandlerError, Launcher};

use super::extract_after;

const SEARCH_TERMS: [&str; 5] = ["search for", "google", "search", "look up", "find"];
const INFO_TERMS: [&str; 4] = ["tell me about", "what is", "who is", "define"];

const MUSIC_URL: &str = "https://music.youtube.com";

/// Query spoken after a search phrase
pub fn search_query(utterance: &str) -> Option<String> {
    extract_after(utterance, &SEARCH_TERMS)
}

/// Topic spoken after an information phrase
pub fn info_topic(utterance: &str) -> Option<String> {
    extract_after(utterance, &INFO_TERMS)
}

/// Opens web search results
pub struct SearchHandler {
    launcher: Arc<dyn Launcher>,
}

impl SearchHandler {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self { launcher }
    }
}

#[async_trait]
impl ActionHandler for SearchHandler {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        let Some(query) = search_query(utterance) else {
            return Ok(DispatchResult::reply("What would you like me to search for?"));
        };

        info!(%query, "opening search results");
        let url = format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(&query)
        );
        self.launcher.open_url(&url).await?;

        Ok(DispatchResult::reply(format!(
            "I've opened search results for {query}"
        )))
    }
}

/// Opens the encyclopedia article for a topic
pub struct InfoHandler {
    launcher: Arc<dyn Launcher>,
}

impl InfoHandler {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self { launcher }
    }
}

#[async_trait]
impl ActionHandler for InfoHandler {
    fn name(&self) -> &'static str {
        "info"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        let Some(topic) = info_topic(utterance) else {
            return Ok(DispatchResult::reply("What would you like to know about?"));
        };

        info!(%topic, "opening article");
        let article = topic.replace(' ', "_");
        let url = format!(
            "https://en.wikipedia.org/wiki/{}",
            urlencoding::encode(&article)
        );
        self.launcher.open_url(&url).await?;

        Ok(DispatchResult::reply(format!(
            "I've opened information about {topic}"
        )))
    }
}

/// Starts music playback in the browser
pub struct MusicHandler {
    launcher: Arc<dyn Launcher>,
}

impl MusicHandler {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self { launcher }
    }
}

#[async_trait]
impl ActionHandler for MusicHandler {
    fn name(&self) -> &'static str {
        "music"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        if utterance.contains("play") {
            self.launcher.open_url(MUSIC_URL).await?;
            Ok(DispatchResult::reply("Opening YouTube Music"))
        } else if utterance.contains("pause") || utterance.contains("stop") {
            Ok(DispatchResult::reply(
                "Music control requires integration with your music player.",
            ))
        } else {
            Ok(DispatchResult::reply(
                "Please specify what you'd like to do with music.",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::launcher::testing::RecordingLauncher;

    #[test]
    fn test_search_query_extraction() {
        assert_eq!(
            search_query("search for rust programming").as_deref(),
            Some("rust programming")
        );
        assert_eq!(search_query("google the moon").as_deref(), Some("the moon"));
        assert_eq!(search_query("search"), None);
    }

    #[tokio::test]
    async fn test_search_opens_encoded_url() {
        let launcher = Arc::new(RecordingLauncher::default());
        let handler = SearchHandler::new(launcher.clone());

        let result = handler.handle("search for rust programming").await.unwrap();

        assert_eq!(
            result.response.as_deref(),
            Some("I've opened search results for rust programming")
        );
        assert_eq!(
            launcher.urls(),
            vec!["https://www.google.com/search?q=rust%20programming"]
        );
    }

    #[tokio::test]
    async fn test_search_without_query_asks() {
        let launcher = Arc::new(RecordingLauncher::default());
        let result = SearchHandler::new(launcher.clone())
            .handle("search")
            .await
            .unwrap();

        assert!(result.response.unwrap().contains("What would you like"));
        assert!(launcher.urls().is_empty());
    }

    #[tokio::test]
    async fn test_info_opens_article() {
        let launcher = Arc::new(RecordingLauncher::default());
        let result = InfoHandler::new(launcher.clone())
            .handle("tell me about alan turing")
            .await
            .unwrap();

        assert_eq!(
            result.response.as_deref(),
            Some("I've opened information about alan turing")
        );
        assert_eq!(launcher.urls(), vec!["https://en.wikipedia.org/wiki/alan_turing"]);
    }

    #[tokio::test]
    async fn test_music_play_and_pause() {
        let launcher = Arc::new(RecordingLauncher::default());
        let handler = MusicHandler::new(launcher.clone());

        let played = handler.handle("play music").await.unwrap();
        assert_eq!(played.response.as_deref(), Some("Opening YouTube Music"));
        assert_eq!(launcher.urls(), vec![MUSIC_URL]);

        let paused = handler.handle("pause music").await.unwrap();
        assert!(paused.response.unwrap().contains("integration"));
        assert_eq!(launcher.urls().len(), 1);
    }
}
