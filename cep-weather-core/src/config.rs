use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::{Path, PathBuf}};

use crate::provider::{viacep, weatherapi};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

pub const ENV_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_BIND_ADDR: &str = "CEP_WEATHER_BIND_ADDR";
pub const ENV_LOOKUP_URL: &str = "CEP_WEATHER_LOOKUP_URL";
pub const ENV_WEATHER_URL: &str = "CEP_WEATHER_WEATHER_URL";
pub const ENV_INSECURE_TLS: &str = "CEP_WEATHER_INSECURE_TLS";
pub const ENV_HTTP_TIMEOUT: &str = "CEP_WEATHER_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: DEFAULT_BIND_ADDR.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self { base_url: viacep::DEFAULT_BASE_URL.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self { base_url: weatherapi::DEFAULT_BASE_URL.to_string(), api_key: None }
    }
}

/// Outbound transport settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Skip TLS certificate verification. Only meant for broken local setups.
    pub danger_accept_invalid_certs: bool,

    /// Whole-request timeout; `None` keeps the transport defaults.
    pub timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [server]
/// bind_addr = "0.0.0.0:8080"
///
/// [weather]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub lookup: LookupConfig,
    pub weather: WeatherConfig,
    pub http: HttpConfig,
}

impl Config {
    /// Load config from the platform config directory, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cep-weather", "cep-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.weather.api_key = Some(key);
        }
        if let Some(addr) = get(ENV_BIND_ADDR) {
            self.server.bind_addr = addr;
        }
        if let Some(url) = get(ENV_LOOKUP_URL) {
            self.lookup.base_url = url;
        }
        if let Some(url) = get(ENV_WEATHER_URL) {
            self.weather.base_url = url;
        }
        if let Some(flag) = get(ENV_INSECURE_TLS) {
            self.http.danger_accept_invalid_certs = parse_flag(&flag)
                .ok_or_else(|| anyhow!("{ENV_INSECURE_TLS} must be true/false, got '{flag}'"))?;
        }
        if let Some(secs) = get(ENV_HTTP_TIMEOUT) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{ENV_HTTP_TIMEOUT} must be a number of seconds"))?;
            self.http.timeout_secs = Some(secs);
        }

        Ok(())
    }

    /// Set/replace the weather service API key.
    pub fn set_weather_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key);
    }

    /// Returns the weather service API key, or an error with a setup hint.
    pub fn weather_api_key(&self) -> Result<&str> {
        self.weather
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No weather API key configured.\n\
                     Hint: run `cep-weather configure` or set {ENV_API_KEY}."
                )
            })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.server.bind_addr))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
