use async_trait::async_trait;
use reqwest::Client;

use crate::model::WeatherResult;

use super::{ProviderError, WeatherProvider, get_json};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

const SERVICE: &str = "WeatherAPI";

/// WeatherAPI.com current conditions (`GET {base}/current.json?key=..&q=..`).
#[derive(Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: String) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for WeatherApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn current_weather(&self, locality: &str) -> Result<WeatherResult, ProviderError> {
        let url = format!("{}/current.json", self.base_url);
        tracing::debug!(%url, service = SERVICE, locality, "fetching current weather");

        let request = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", locality)]);

        get_json(SERVICE, request).await
    }
}
