use async_trait::async_trait;
use reqwest::Client;

use crate::model::LocationLookupResult;

use super::{LocationLookup, ProviderError, get_json};

pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br";

const SERVICE: &str = "ViaCEP";

/// ViaCEP postal code lookup (`GET {base}/ws/{cep}/json/`).
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    base_url: String,
    http: Client,
}

impl ViaCepClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// The code is interpolated as-is; no format validation happens here.
    pub fn lookup_url(&self, cep: &str) -> String {
        format!("{}/ws/{}/json/", self.base_url, cep)
    }
}

#[async_trait]
impl LocationLookup for ViaCepClient {
    async fn lookup(&self, cep: &str) -> Result<LocationLookupResult, ProviderError> {
        let url = self.lookup_url(cep);
        tracing::debug!(%url, service = SERVICE, "looking up postal code");

        get_json(SERVICE, self.http.get(&url)).await
    }
}
