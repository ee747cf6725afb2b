use crate::{
    config::HttpConfig,
    model::{LocationLookupResult, WeatherResult},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

pub mod viacep;
pub mod weatherapi;

pub use viacep::ViaCepClient;
pub use weatherapi::WeatherApiClient;

/// Failure talking to one of the upstream services.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {service} failed")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} answered with status {status}: {body}")]
    Status { service: &'static str, status: StatusCode, body: String },

    #[error("failed to decode {service} response")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    /// Upstream HTTP status, if the service answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Resolves a postal code to a locality.
#[async_trait]
pub trait LocationLookup: Send + Sync + Debug {
    async fn lookup(&self, cep: &str) -> Result<LocationLookupResult, ProviderError>;
}

/// Reports current conditions for a named locality.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, locality: &str) -> Result<WeatherResult, ProviderError>;
}

/// Build the outbound HTTP client shared by all providers.
///
/// Certificates are verified unless `danger_accept_invalid_certs` is set.
pub fn build_http_client(config: &HttpConfig) -> anyhow::Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("cep-weather/", env!("CARGO_PKG_VERSION")));

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    if config.danger_accept_invalid_certs {
        tracing::warn!("TLS certificate verification is DISABLED for outbound requests");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().context("Failed to build HTTP client")
}

/// Send a GET, read the whole body and decode it as JSON.
///
/// The body is always drained so the pooled connection is released on every path.
pub(crate) async fn get_json<T>(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError>
where
    T: serde::de::DeserializeOwned,
{
    let res = request.send().await.map_err(|source| ProviderError::Transport { service, source })?;

    let status = res.status();
    let body = res.text().await.map_err(|source| ProviderError::Transport { service, source })?;

    if !status.is_success() {
        return Err(ProviderError::Status { service, status, body: truncate_body(&body) });
    }

    serde_json::from_str(&body).map_err(|source| ProviderError::Decode { service, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
