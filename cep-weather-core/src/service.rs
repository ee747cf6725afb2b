//! The postal code → temperature pipeline.
//!
//! Two strictly sequential upstream calls: the locality from the lookup
//! service feeds the weather query. Nothing is retried.

use reqwest::StatusCode;
use thiserror::Error;

use crate::{
    model::TemperatureResponse,
    provider::{LocationLookup, ProviderError, WeatherProvider},
};

#[derive(Debug, Error)]
pub enum TemperatureError {
    /// The lookup service rejected the code with `400 Bad Request`.
    #[error("can not find zipcode")]
    ZipcodeNotFound,

    /// The lookup service answered but flagged the code as erroneous.
    #[error("invalid zipcode")]
    InvalidZipcode,

    #[error("zipcode lookup failed")]
    Lookup(#[source] ProviderError),

    #[error("weather lookup failed")]
    Weather(#[source] ProviderError),
}

#[derive(Debug)]
pub struct TemperatureService {
    lookup: Box<dyn LocationLookup>,
    weather: Box<dyn WeatherProvider>,
}

impl TemperatureService {
    pub fn new(lookup: Box<dyn LocationLookup>, weather: Box<dyn WeatherProvider>) -> Self {
        Self { lookup, weather }
    }

    pub async fn temperature_for(&self, cep: &str) -> Result<TemperatureResponse, TemperatureError> {
        let location = match self.lookup.lookup(cep).await {
            Ok(location) => location,
            Err(err) if err.status() == Some(StatusCode::BAD_REQUEST) => {
                return Err(TemperatureError::ZipcodeNotFound);
            }
            Err(err) => return Err(TemperatureError::Lookup(err)),
        };

        let Some(locality) = location.locality() else {
            return Err(TemperatureError::InvalidZipcode);
        };

        tracing::debug!(cep, locality, "postal code resolved");

        let weather = self
            .weather
            .current_weather(locality)
            .await
            .map_err(TemperatureError::Weather)?;

        Ok(TemperatureResponse::from(weather))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, LocationLookupResult, WeatherResult};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    enum LookupReply {
        Found(&'static str),
        Flagged,
        Status(StatusCode),
        Undecodable,
    }

    #[derive(Debug)]
    struct FakeLookup(LookupReply);

    #[async_trait]
    impl LocationLookup for FakeLookup {
        async fn lookup(&self, cep: &str) -> Result<LocationLookupResult, ProviderError> {
            match &self.0 {
                LookupReply::Found(city) => Ok(LocationLookupResult {
                    cep: cep.to_string(),
                    localidade: city.to_string(),
                    erro: String::new(),
                }),
                LookupReply::Flagged => Ok(LocationLookupResult {
                    erro: "true".into(),
                    localidade: "should not be used".into(),
                    ..Default::default()
                }),
                LookupReply::Status(status) => Err(ProviderError::Status {
                    service: "fake",
                    status: *status,
                    body: String::new(),
                }),
                LookupReply::Undecodable => Err(ProviderError::Decode {
                    service: "fake",
                    source: serde_json::from_str::<u8>("<html>").unwrap_err(),
                }),
            }
        }
    }

    #[derive(Debug)]
    struct FakeWeather {
        temp_c: Option<f64>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn current_weather(&self, locality: &str) -> Result<WeatherResult, ProviderError> {
            self.seen.lock().unwrap().push(locality.to_string());
            match self.temp_c {
                Some(temp_c) => Ok(WeatherResult { current: CurrentConditions { temp_c } }),
                None => Err(ProviderError::Status {
                    service: "fake",
                    status: StatusCode::FORBIDDEN,
                    body: "invalid key".into(),
                }),
            }
        }
    }

    fn service(lookup: LookupReply, temp_c: Option<f64>) -> (TemperatureService, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let weather = FakeWeather { temp_c, seen: seen.clone() };
        (TemperatureService::new(Box::new(FakeLookup(lookup)), Box::new(weather)), seen)
    }

    #[tokio::test]
    async fn resolves_locality_then_converts_temperature() {
        let (svc, seen) = service(LookupReply::Found("Alfenas"), Some(25.0));

        let resp = svc.temperature_for("37130093").await.unwrap();

        assert_eq!(resp.celsius(), 25.0);
        assert!((resp.fahrenheit() - 77.0).abs() < 1e-5);
        assert!((resp.kelvin() - 298.15).abs() < 1e-5);
        assert_eq!(*seen.lock().unwrap(), vec!["Alfenas".to_string()]);
    }

    #[tokio::test]
    async fn bad_request_from_lookup_means_not_found() {
        let (svc, seen) = service(LookupReply::Status(StatusCode::BAD_REQUEST), Some(25.0));

        let err = svc.temperature_for("371300930").await.unwrap_err();

        assert!(matches!(err, TemperatureError::ZipcodeNotFound));
        assert_eq!(err.to_string(), "can not find zipcode");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn flagged_lookup_means_invalid_and_skips_weather() {
        let (svc, seen) = service(LookupReply::Flagged, Some(25.0));

        let err = svc.temperature_for("37009999").await.unwrap_err();

        assert!(matches!(err, TemperatureError::InvalidZipcode));
        assert_eq!(err.to_string(), "invalid zipcode");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_lookup_failures_are_upstream_errors() {
        for reply in [LookupReply::Status(StatusCode::BAD_GATEWAY), LookupReply::Undecodable] {
            let (svc, seen) = service(reply, Some(25.0));

            let err = svc.temperature_for("37130093").await.unwrap_err();

            assert!(matches!(err, TemperatureError::Lookup(_)), "got {err:?}");
            assert!(seen.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn weather_failure_is_an_upstream_error() {
        let (svc, _) = service(LookupReply::Found("Alfenas"), None);

        let err = svc.temperature_for("37130093").await.unwrap_err();

        assert!(matches!(err, TemperatureError::Weather(ProviderError::Status { .. })));
    }

    #[tokio::test]
    async fn code_is_forwarded_without_validation() {
        let (svc, _) = service(LookupReply::Found("Somewhere"), Some(0.0));

        let resp = svc.temperature_for("not a cep!").await.unwrap();
        assert!((resp.fahrenheit() - 32.0).abs() < 1e-5);
    }
}
