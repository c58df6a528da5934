//! Render serialization
//!
//! Every render takes the render lock before it starts. Non-blocking renders
//! take it on the caller's task and release it from the background task once
//! playback ends, so renders always play in the order they were requested.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::{Renderer, ResponseSink};

pub struct SerializedSink {
    renderer: Arc<dyn Renderer>,
    render_lock: Arc<Mutex<()>>,
}

impl SerializedSink {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            render_lock: Arc::new(Mutex::new(())),
        }
    }
}

async fn speak_logged(renderer: &dyn Renderer, text: &str) {
    if let Err(e) = renderer.speak(text).await {
        error!(error = %e, "failed to render response");
    }
}

#[async_trait]
impl ResponseSink for SerializedSink {
    async fn render(&self, text: &str, blocking: bool) {
        let guard = Arc::clone(&self.render_lock).lock_owned().await;
        debug!(blocking, "rendering response");

        if blocking {
            speak_logged(self.renderer.as_ref(), text).await;
            drop(guard);
        } else {
            let renderer = Arc::clone(&self.renderer);
            let text = text.to_owned();
            tokio::spawn(async move {
                speak_logged(renderer.as_ref(), &text).await;
                drop(guard);
            });
        }
    }

    async fn flush(&self) {
        let _guard = self.render_lock.lock().await;
    }
}
