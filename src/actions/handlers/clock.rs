//! Time and date announcements

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};

use crate::actions::{ActionHandler, DispatchResult, HandlerError};

/// Speaks the current local time
pub struct TimeHandler;

/// Speaks today's date
pub struct DateHandler;

pub fn format_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("It's {}", now.format("%I:%M %p"))
}

pub fn format_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Today is {}", now.format("%A, %B %d, %Y"))
}

#[async_trait]
impl ActionHandler for TimeHandler {
    fn name(&self) -> &'static str {
        "time"
    }

    async fn handle(&self, _utterance: &str) -> Result<DispatchResult, HandlerError> {
        Ok(DispatchResult::reply(format_time(&Local::now())))
    }
}

#[async_trait]
impl ActionHandler for DateHandler {
    fn name(&self) -> &'static str {
        "date"
    }

    async fn handle(&self, _utterance: &str) -> Result<DispatchResult, HandlerError> {
        Ok(DispatchResult::reply(format_date(&Local::now())))
    }
}
