use std::env;
use std::fmt;

use tokio::time::Duration;

pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const API_KEY_VAR: &str = "AZURE_OPENAI_API_KEY";
pub const API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";
pub const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("incomplete Azure OpenAI configuration, missing: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("AZURE_OPENAI_ENDPOINT must be an http:// or https:// URL, got {0:?}")]
    InvalidEndpoint(String),
}

/// Loads `.env` from the working directory. A missing file is not an error.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::dotenv().map(|_| ()))
}

fn ignore_missing(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(err) if err.not_found() => Ok(()),
        other => other,
    }
}

/// Settings for the Azure OpenAI deployment. Loaded once at startup and never
/// mutated afterwards.
#[derive(Clone)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub deployment_name: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Absent, empty and
    /// whitespace-only values all count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            match lookup(key).map(|value| value.trim().to_string()) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let endpoint = required(ENDPOINT_VAR);
        let api_key = required(API_KEY_VAR);
        let api_version = required(API_VERSION_VAR);
        let deployment_name = required(DEPLOYMENT_VAR);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint));
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            api_version,
            deployment_name,
        })
    }
}

// Keeps the key out of logs.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("deployment_name", &self.deployment_name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let request_timeout = lookup("AZURE_OPENAI_TIMEOUT_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        Self {
            port,
            request_timeout,
        }
    }
}
