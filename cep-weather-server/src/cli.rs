use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use cep_weather_core::{Config, service_from_config};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};

use crate::{server, telemetry};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cep-weather", version, about = "Current temperature for a Brazilian postal code")]
pub struct Cli {
    /// Path to the config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default).
    Serve {
        /// Address to listen on, e.g. "0.0.0.0:8080".
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the WeatherAPI.com key in the config file.
    Configure,

    /// Print where the config file is read from.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_flag = self.config.as_deref();

        match self.command.unwrap_or(Command::Serve { bind: None }) {
            Command::Serve { bind } => {
                telemetry::init(&self.log_level);

                let mut config = load_config(config_flag)?;
                config.apply_env()?;
                if let Some(bind) = bind {
                    config.server.bind_addr = bind;
                }

                let addr = config.bind_addr()?;
                let service = service_from_config(&config)?;

                server::serve(addr, Arc::new(service)).await?;
            }
            Command::Configure => {
                let path = config_path(config_flag)?;
                let mut config = Config::load_from(&path)?;

                let api_key = Password::new("WeatherAPI.com API key:")
                    .with_display_mode(PasswordDisplayMode::Masked)
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                config.set_weather_api_key(api_key.trim().to_string());
                config.weather_api_key()?;
                config.save_to(&path)?;

                println!("Saved configuration to {}", path.display());
            }
            Command::ConfigPath => {
                println!("{}", config_path(config_flag)?.display());
            }
        }

        Ok(())
    }
}

fn config_path(flag: Option<&Path>) -> anyhow::Result<PathBuf> {
    match flag {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_file_path(),
    }
}

fn load_config(flag: Option<&Path>) -> anyhow::Result<Config> {
    match flag {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
