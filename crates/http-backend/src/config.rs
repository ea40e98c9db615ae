use std::fmt::Debug;
use std::time::Duration;

/// The endpoint used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const BASE_URL_VAR: &str = "CAREER_CHAT_API_URL";
const TIMEOUT_VAR: &str = "CAREER_CHAT_TIMEOUT_SECS";

/// Builder for [`HttpBackendConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpBackendConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpBackendConfigBuilder {
    /// Creates a builder with everything left to defaults.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a timeout for every request. Requests never time out unless
    /// this is set.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpBackendConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        HttpBackendConfig {
            base_url,
            timeout: self.timeout,
        }
    }
}

/// Configuration for [`crate::HttpBackend`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpBackendConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Option<Duration>,
}

impl HttpBackendConfig {
    /// Reads the configuration from the process environment.
    ///
    /// `CAREER_CHAT_API_URL` sets the base URL, and
    /// `CAREER_CHAT_TIMEOUT_SECS` sets an optional request timeout.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = HttpBackendConfigBuilder::new();
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|v| !v.is_empty())
        {
            builder = builder.with_base_url(base_url);
        }
        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            match timeout.parse::<u64>() {
                Ok(secs) => {
                    builder = builder.with_timeout(Duration::from_secs(secs))
                }
                Err(_) => warn!("ignoring invalid {TIMEOUT_VAR}: {timeout:?}"),
            }
        }
        builder.build()
    }

    /// Returns the base URL that endpoints are resolved against.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpBackendConfigBuilder::new().build();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = HttpBackendConfigBuilder::new()
            .with_base_url("https://asha.example.com/api/")
            .build();
        assert_eq!(config.base_url(), "https://asha.example.com/api");
    }

    #[test]
    fn test_from_lookup() {
        let vars = HashMap::from([
            (BASE_URL_VAR, "http://10.0.0.2:9000"),
            (TIMEOUT_VAR, "15"),
        ]);
        let config =
            HttpBackendConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url(), "http://10.0.0.2:9000");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));

        let vars = HashMap::from([(BASE_URL_VAR, ""), (TIMEOUT_VAR, "soon")]);
        let config =
            HttpBackendConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout, None);
    }
}
