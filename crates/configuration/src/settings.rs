use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so an empty `config.toml` (or none
/// at all) still yields a runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub analytics: AnalyticsSettings,
    pub assistant: AssistantSettings,
    pub logging: LoggingSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on request bodies accepted by the JSON endpoints.
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Replaced by `DATABASE_URL` when that variable is set.
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Windows and list sizes used by the analytics endpoints and the dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub default_window_days: u32,
    pub max_window_days: u32,
    pub performance_list_size: usize,
    pub recent_products_limit: usize,
    pub category_overview_limit: usize,
}

/// Settings for the hosted language model behind the assistant endpoint.
///
/// Without an `api_key` the assistant answers from canned replies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub api_key: Option<String>,
    pub model: String,
    /// Base URL; the model path and `:generateContent` are appended to it.
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive. `RUST_LOG` wins when set.
    pub filter: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<String>,
}

// --- Default Implementations ---

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/stockroom".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            default_window_days: 30,
            max_window_days: 365,
            performance_list_size: 5,
            recent_products_limit: 5,
            category_overview_limit: 5,
        }
    }
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            directory: None,
        }
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AssistantSettings {
    /// True when a non-blank API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
