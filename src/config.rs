use std::time::Duration;

/// Startup settings, read from `CALBOOK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// REST backend; `None` runs against the in-memory store.
    pub backend_url: Option<String>,
    pub request_timeout: Duration,
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            request_timeout: Duration::from_secs(10),
            metrics_port: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let backend_url = lookup("CALBOOK_BACKEND_URL").filter(|s| !s.trim().is_empty());
        let request_timeout = lookup("CALBOOK_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let metrics_port = lookup("CALBOOK_METRICS_PORT").and_then(|s| s.parse().ok());
        Self {
            backend_url,
            request_timeout,
            metrics_port,
        }
    }
}
