//! # Configuration
//!
//! Strongly-typed settings for the stockroom server and CLI.
//!
//! ## Sources
//!
//! Values are layered, later sources winning:
//! 1. Built-in defaults on every section.
//! 2. `config.toml` in the working directory (optional), or the file named by `--config`.
//! 3. Environment variables prefixed `STOCKROOM`, using `__` between path segments,
//!    e.g. `STOCKROOM__SERVER__PORT=9000`.
//! 4. `DATABASE_URL` and `GEMINI_API_KEY`, for compatibility with common deployments.
//! 5. Command-line overrides.
//!
//! A `.env` file is loaded into the environment first.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

pub mod error;
pub mod logging;
pub mod settings;

pub use logging::init_tracing;
pub use settings::{
    AnalyticsSettings, AssistantSettings, Config, DatabaseSettings, LoggingSettings,
    ServerSettings,
};

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "STOCKROOM";

/// Command-line overrides shared by every binary.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ConfigOverrides {
    /// Path to a TOML configuration file. It must exist when given explicitly.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub config: Option<PathBuf>,
    /// Overrides `server.host`.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub host: Option<String>,
    /// Overrides `server.port`.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub port: Option<u16>,
}

/// Loads the application configuration from the default sources.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_with(&ConfigOverrides::default())
}

/// Loads the configuration, then applies `overrides` and validates the result.
pub fn load_config_with(overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let (path, required) = match &overrides.config {
        Some(path) => (path.as_path(), true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };

    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(required))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    let mut config = from_builder(builder)?;

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    if !config.assistant.is_configured() {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.assistant.api_key = Some(key);
        }
    }

    config.apply_overrides(overrides);
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}

fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Config, ConfigError> {
    Ok(builder.build()?.try_deserialize::<Config>()?)
}

impl Config {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let analytics = &self.analytics;
        if analytics.max_window_days < 1 {
            return Err(ConfigError::ValidationError(
                "analytics.max_window_days must be at least 1".to_string(),
            ));
        }
        if analytics.default_window_days > analytics.max_window_days {
            return Err(ConfigError::ValidationError(format!(
                "analytics.default_window_days ({}) exceeds analytics.max_window_days ({})",
                analytics.default_window_days, analytics.max_window_days
            )));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must not be 0".to_string(),
            ));
        }
        Ok(())
    }
}
