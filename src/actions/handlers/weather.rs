//! Current weather from OpenWeatherMap

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::actions::{ActionHandler, DispatchResult, HandlerError};
use crate::config::ApiKeys;

const API_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
const SERVICE: &str = "openweather";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const NOT_CONFIGURED: &str = "Weather service is not configured. Please set up your API key.";
const UNAVAILABLE: &str = "Weather service is currently unavailable.";

/// Subset of the current-weather response that gets spoken
#[derive(Debug, Deserialize)]
pub struct WeatherReport {
    pub main: MainReadings,
    pub weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub description: String,
}

impl WeatherReport {
    pub fn describe(&self, city: &str) -> String {
        let description = self
            .weather
            .first()
            .map(|c| c.description.as_str())
            .unwrap_or("unsettled");

        format!(
            "The weather in {city} is {description} with a temperature of {}°C, \
             feels like {}°C, and humidity at {}%",
            self.main.temp.round(),
            self.main.feels_like.round(),
            self.main.humidity.round(),
        )
    }
}

/// Answers weather questions for the default or a named city
pub struct WeatherHandler {
    api_keys: ApiKeys,
    default_city: String,
    base_url: String,
    client: reqwest::Client,
}

impl WeatherHandler {
    pub fn new(api_keys: ApiKeys, default_city: String) -> Self {
        Self {
            api_keys,
            default_city,
            base_url: API_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point requests at another endpoint
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// City named after the last " in ", else the default city
    pub fn city_for(&self, utterance: &str) -> String {
        utterance
            .rsplit_once(" in ")
            .map(|(_, city)| city.trim().trim_end_matches('?').trim())
            .filter(|city| !city.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_city.clone())
    }
}

#[async_trait]
impl ActionHandler for WeatherHandler {
    fn name(&self) -> &'static str {
        "weather"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        let Some(api_key) = self.api_keys.get(SERVICE) else {
            warn!("weather requested without an api key");
            return Ok(DispatchResult::reply(NOT_CONFIGURED));
        };

        let city = self.city_for(utterance);
        info!(%city, "fetching weather");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", city.as_str()), ("appid", api_key.as_str()), ("units", "metric")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "weather request failed");
                return Ok(DispatchResult::reply(UNAVAILABLE));
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), %city, "weather lookup rejected");
            return Ok(DispatchResult::reply(format!(
                "Sorry, I couldn't get weather information for {city}."
            )));
        }

        let report: WeatherReport = response.json().await?;
        Ok(DispatchResult::reply(report.describe(&city)))
    }
}
