use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration. Every field has a default so a partial JSON object
/// deserializes into a complete config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// 0 disables the periodic sweep; expired entries are still never served.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// `http://`, `https://` or `socks5://` proxy applied to every request.
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_retries() -> u32 {
    3
}

fn default_cache_ttl_seconds() -> u64 {
    3600
}

fn default_max_cache_entries() -> usize {
    100
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_sweep_interval_seconds() -> u64 {
    120
}

fn default_user_agent() -> String {
    "Mozilla/5.0".into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            max_cache_entries: default_max_cache_entries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        if self.sweep_interval_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.sweep_interval_seconds))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.retries, 3);
        assert_eq!(config.cache_ttl_seconds, 3600);
        assert_eq!(config.max_cache_entries, 100);
        assert_eq!(config.sweep_interval(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"timeout_ms": 10000, "cache_ttl_seconds": 60}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.retries, 3);
        assert_eq!(config.max_cache_entries, 100);
        assert_eq!(config.user_agent, "Mozilla/5.0");
        assert_eq!(config.proxy, None);
    }

    #[test]
    fn zero_sweep_interval_disables_sweep() {
        let config = ClientConfig {
            sweep_interval_seconds: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.sweep_interval(), None);
    }
}
