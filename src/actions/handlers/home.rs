//! Smart home and reminder stand-ins
//!
//! Neither integration is connected yet; both acknowledge the request so the
//! user knows it was understood.

use async_trait::async_trait;

use crate::actions::{ActionHandler, DispatchResult, HandlerError};

use super::extract_after;

pub struct SmartHomeHandler;

#[async_trait]
impl ActionHandler for SmartHomeHandler {
    fn name(&self) -> &'static str {
        "smart_home"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        let reply = if utterance.contains("lights on") {
            "I would turn on the lights if connected to your smart home system."
        } else if utterance.contains("lights off") {
            "I would turn off the lights if connected to your smart home system."
        } else if utterance.contains("temperature") || utterance.contains("thermostat") {
            "Temperature control requires smart home integration."
        } else {
            "Smart home features require additional setup."
        };
        Ok(DispatchResult::reply(reply))
    }
}

pub struct ReminderHandler;

#[async_trait]
impl ActionHandler for ReminderHandler {
    fn name(&self) -> &'static str {
        "reminder"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        match extract_after(utterance, &["remind me to"]) {
            Some(task) => Ok(DispatchResult::reply(format!(
                "I'll remind you to {task}. Note: Reminder system needs to be configured."
            ))),
            None => Ok(DispatchResult::reply(
                "What would you like me to remind you about?",
            )),
        }
    }
}
