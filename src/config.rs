//! Environment-driven runtime configuration.

use std::time::Duration;

/// Overall wall-clock budget for one task request.
const DEFAULT_OVERALL_TIMEOUT: Duration = Duration::from_secs(170);

/// Inference backend settings; absent unless an API key is configured.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret inbound requests must present.
    pub secret: String,
    /// Default recipient email when a request omits one.
    pub email: String,
    /// Optional inference backend.
    pub oracle: Option<OracleConfig>,
    /// Overall per-request deadline.
    pub overall_timeout: Duration,
}

impl Config {
    /// Read configuration from `SPHINX_*` environment variables.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("SPHINX_SECRET").unwrap_or_else(|_| "change-me".to_string());
        let email = std::env::var("SPHINX_EMAIL")
            .unwrap_or_else(|_| "solver@example.com".to_string());

        let oracle = std::env::var("SPHINX_ORACLE_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(|api_key| OracleConfig {
                base_url: std::env::var("SPHINX_ORACLE_URL").unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com".to_string()
                }),
                model: std::env::var("SPHINX_ORACLE_MODEL")
                    .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
                api_key,
            });

        let overall_timeout = std::env::var("SPHINX_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_OVERALL_TIMEOUT);

        Self {
            secret,
            email,
            oracle,
            overall_timeout,
        }
    }

    /// Whether the shared secret is still the placeholder.
    pub fn secret_is_default(&self) -> bool {
        self.secret == "change-me"
    }
}
