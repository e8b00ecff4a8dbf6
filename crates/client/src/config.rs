use std::time::Duration;

use sheetport_core::api_path::ApiBase;
use sheetport_core::error::CoreError;

pub const ENV_API_BASE: &str = "SHEETPORT_API_BASE";
pub const ENV_ORIGIN: &str = "SHEETPORT_ORIGIN";
pub const ENV_POLL_INTERVAL_MS: &str = "SHEETPORT_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SHEETPORT_REQUEST_TIMEOUT_SECS";

/// Origin whose `/api` proxy is used when no API base is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Interval between job status poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Client configuration, resolved once at startup and passed explicitly.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root URL every endpoint is built from.
    pub api_base: ApiBase,
    /// Interval between job status poll cycles.
    pub poll_interval: Duration,
    /// Per-request timeout; `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

/// Errors while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    BaseUrl(#[from] CoreError),
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `SHEETPORT_API_BASE`             | unset (use origin proxy)|
    /// | `SHEETPORT_ORIGIN`               | `http://localhost:5173` |
    /// | `SHEETPORT_POLL_INTERVAL_MS`     | `2000`                  |
    /// | `SHEETPORT_REQUEST_TIMEOUT_SECS` | unset (no timeout)      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup(ENV_API_BASE);
        let origin = lookup(ENV_ORIGIN)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let api_base = ApiBase::resolve(api_base.as_deref(), &origin)?;

        let poll_interval = match parse_u64(&lookup, ENV_POLL_INTERVAL_MS)? {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    var: ENV_POLL_INTERVAL_MS,
                    value: "0".to_string(),
                    reason: "must be greater than zero".to_string(),
                })
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_POLL_INTERVAL,
        };

        let request_timeout = parse_u64(&lookup, ENV_REQUEST_TIMEOUT_SECS)?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            api_base,
            poll_interval,
            request_timeout,
        })
    }
}

fn parse_u64<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var).filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_base.as_str(), "http://localhost:5173/api");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn explicit_base_and_intervals() {
        let config = load(&[
            (ENV_API_BASE, "http://backend:8080/"),
            (ENV_POLL_INTERVAL_MS, "250"),
            (ENV_REQUEST_TIMEOUT_SECS, "15"),
        ])
        .unwrap();
        assert_eq!(config.api_base.as_str(), "http://backend:8080");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn custom_origin_without_base() {
        let config = load(&[(ENV_ORIGIN, "https://tool.example.com")]).unwrap();
        assert_eq!(config.api_base.as_str(), "https://tool.example.com/api");
    }

    #[test]
    fn invalid_interval_is_reported() {
        assert_matches!(
            load(&[(ENV_POLL_INTERVAL_MS, "soon")]),
            Err(ConfigError::Invalid { var: ENV_POLL_INTERVAL_MS, .. })
        );
        assert_matches!(
            load(&[(ENV_POLL_INTERVAL_MS, "0")]),
            Err(ConfigError::Invalid { .. })
        );
    }

    #[test]
    fn zero_timeout_means_none() {
        let config = load(&[(ENV_REQUEST_TIMEOUT_SECS, "0")]).unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn bad_base_url_is_reported() {
        assert_matches!(
            load(&[(ENV_API_BASE, "::nope::")]),
            Err(ConfigError::BaseUrl(_))
        );
    }
}
