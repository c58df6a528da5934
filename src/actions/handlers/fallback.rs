use async_trait::async_trait;

use crate::actions::{ActionHandler, DispatchResult, HandlerError};

/// Answers anything no other handler claims
pub struct FallbackHandler;

#[async_trait]
impl ActionHandler for FallbackHandler {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn handle(&self, _utterance: &str) -> Result<DispatchResult, HandlerError> {
        Ok(DispatchResult::reply(
            "I'm not sure how to help with that. Could you please rephrase?",
        ))
    }
}
