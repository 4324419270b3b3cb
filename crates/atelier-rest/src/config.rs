//! Environment-backed runtime configuration for the API client.

use std::{env, error::Error, fmt, time::Duration};

use url::Url;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_USER_AGENT: &str = concat!("atelier-admin-client/", env!("CARGO_PKG_VERSION"));

/// Connection settings for one `ApiClient` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Backend API base URL, for example `https://api.atelier.example/api`.
    pub base_url: Url,
    /// Hard per-request timeout. A backend that never answers fails the
    /// request instead of pinning a page in its loading state.
    pub request_timeout: Duration,
    /// User-agent sent with every request.
    pub user_agent: String,
}

impl ApiClientConfig {
    /// Build a config with default timeout and user-agent.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Parse configuration from environment variables.
    ///
    /// `ATELIER_API_URL` is required; `ATELIER_HTTP_TIMEOUT_MS` overrides the
    /// default request timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let raw_base_url = optional_trimmed_env("ATELIER_API_URL", &mut lookup)
            .ok_or(ConfigError::Missing {
                key: "ATELIER_API_URL",
            })?;
        let base_url = Url::parse(&raw_base_url).map_err(|err| ConfigError::InvalidValue {
            key: "ATELIER_API_URL",
            value: raw_base_url,
            reason: err.to_string(),
        })?;

        let timeout_ms = parse_optional_u64_with_default(
            "ATELIER_HTTP_TIMEOUT_MS",
            DEFAULT_REQUEST_TIMEOUT_MS,
            &mut lookup,
        )?;
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ATELIER_HTTP_TIMEOUT_MS",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        Ok(Self {
            base_url,
            request_timeout: Duration::from_millis(timeout_ms),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }
}

/// Errors produced while parsing runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is absent.
    Missing { key: &'static str },
    /// An environment variable could not be parsed.
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "missing required {key}"),
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key}='{value}': {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

fn optional_trimmed_env<F>(key: &'static str, lookup: &mut F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_optional_u64_with_default<F>(
    key: &'static str,
    default: u64,
    lookup: &mut F,
) -> Result<u64, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    value.parse::<u64>().map_err(|err| ConfigError::InvalidValue {
        key,
        value,
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from_pairs(pairs: &[(&str, &str)]) -> Result<ApiClientConfig, ConfigError> {
        let map = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();
        ApiClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn parses_base_url_and_defaults() {
        let cfg = config_from_pairs(&[("ATELIER_API_URL", "https://api.atelier.example/api")])
            .expect("config should parse");

        assert_eq!(cfg.base_url.as_str(), "https://api.atelier.example/api");
        assert_eq!(
            cfg.request_timeout,
            Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)
        );
    }

    #[test]
    fn requires_base_url() {
        let err = config_from_pairs(&[]).expect_err("missing base URL should fail");
        assert_eq!(
            err,
            ConfigError::Missing {
                key: "ATELIER_API_URL"
            }
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = config_from_pairs(&[("ATELIER_API_URL", "not a url")])
            .expect_err("invalid base URL should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "ATELIER_API_URL",
                ..
            }
        ));
    }

    #[test]
    fn parses_timeout_override_and_rejects_zero() {
        let cfg = config_from_pairs(&[
            ("ATELIER_API_URL", "https://api.atelier.example"),
            ("ATELIER_HTTP_TIMEOUT_MS", "5000"),
        ])
        .expect("config should parse");
        assert_eq!(cfg.request_timeout, Duration::from_millis(5_000));

        let err = config_from_pairs(&[
            ("ATELIER_API_URL", "https://api.atelier.example"),
            ("ATELIER_HTTP_TIMEOUT_MS", "0"),
        ])
        .expect_err("zero timeout should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "ATELIER_HTTP_TIMEOUT_MS",
                ..
            }
        ));
    }
}
