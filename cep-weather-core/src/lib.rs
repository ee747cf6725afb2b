//! Core library for the `cep-weather` service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the postal code lookup and weather services
//! - The request pipeline turning a postal code into a temperature report
//!
//! It is used by `cep-weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod model;
pub mod provider;
pub mod service;

pub use config::Config;
pub use model::{LocationLookupResult, TemperatureResponse, WeatherResult};
pub use provider::{LocationLookup, ProviderError, ViaCepClient, WeatherApiClient, WeatherProvider};
pub use service::{TemperatureError, TemperatureService};

/// Wire up the real upstream clients from configuration.
pub fn service_from_config(config: &Config) -> anyhow::Result<TemperatureService> {
    let api_key = config.weather_api_key()?.to_owned();
    let http = provider::build_http_client(&config.http)?;

    let lookup = ViaCepClient::new(http.clone(), config.lookup.base_url.as_str());
    let weather = WeatherApiClient::new(http, config.weather.base_url.as_str(), api_key);

    Ok(TemperatureService::new(Box::new(lookup), Box::new(weather)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_from_config_requires_api_key() {
        let err = service_from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No weather API key configured"));
    }

    #[test]
    fn service_from_config_works_when_key_is_set() {
        let mut cfg = Config::default();
        cfg.set_weather_api_key("KEY".into());

        assert!(service_from_config(&cfg).is_ok());
    }
}
