//! Client configuration: backend endpoints, optional request timeout,
//! default indicator period and label display offset.
//!
//! | Field | Environment | Default |
//! |-------|-------------|---------|
//! | `api_base_url` | `TICKLINE_API_URL` | `http://localhost:4000` |
//! | `stream_url` | `TICKLINE_STREAM_URL` | `ws://localhost:4000/stocks` |
//! | `request_timeout_ms` | `TICKLINE_TIMEOUT_MS` | unset (no timeout) |
//! | `indicator_period` | `TICKLINE_INDICATOR_PERIOD` | `5` |
//! | `label_offset` | `TICKLINE_LABEL_OFFSET` | `+00:00` |

use time::UtcOffset;

use crate::domain::parse_utc_offset;
use crate::indicators::DEFAULT_PERIOD;
use crate::{LabelFormatter, ValidationError};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_STREAM_URL: &str = "ws://localhost:4000/stocks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub stream_url: String,
    pub request_timeout_ms: Option<u64>,
    pub indicator_period: usize,
    pub label_offset: UtcOffset,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            stream_url: String::from(DEFAULT_STREAM_URL),
            request_timeout_ms: None,
            indicator_period: DEFAULT_PERIOD,
            label_offset: UtcOffset::UTC,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with any `TICKLINE_*` variables present in the
    /// process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("TICKLINE_API_URL") {
            config.api_base_url = non_empty("TICKLINE_API_URL", url)?;
        }
        if let Some(url) = lookup("TICKLINE_STREAM_URL") {
            config.stream_url = non_empty("TICKLINE_STREAM_URL", url)?;
        }
        if let Some(raw) = lookup("TICKLINE_TIMEOUT_MS") {
            let timeout = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("TICKLINE_TIMEOUT_MS", &raw))?;
            config.request_timeout_ms = (timeout > 0).then_some(timeout);
        }
        if let Some(raw) = lookup("TICKLINE_INDICATOR_PERIOD") {
            let period = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|period| *period > 0)
                .ok_or_else(|| invalid("TICKLINE_INDICATOR_PERIOD", &raw))?;
            config.indicator_period = period;
        }
        if let Some(raw) = lookup("TICKLINE_LABEL_OFFSET") {
            config.label_offset =
                parse_utc_offset(&raw).map_err(|_| invalid("TICKLINE_LABEL_OFFSET", &raw))?;
        }

        Ok(config)
    }

    pub fn label_formatter(&self) -> LabelFormatter {
        LabelFormatter::new(self.label_offset)
    }

    /// Join a path onto the API base URL without doubling slashes.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn non_empty(key: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid(key, &value));
    }
    Ok(value.trim().to_owned())
}

fn invalid(key: &'static str, value: &str) -> ValidationError {
    ValidationError::InvalidConfig {
        key,
        value: value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url("/stock/AAPL"), "http://localhost:4000/stock/AAPL");
        assert_eq!(config.request_timeout_ms, None);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("TICKLINE_API_URL", "https://markets.example/"),
            ("TICKLINE_TIMEOUT_MS", "2500"),
            ("TICKLINE_INDICATOR_PERIOD", "9"),
            ("TICKLINE_LABEL_OFFSET", "+05:30"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.api_url("suggestions/IN"), "https://markets.example/suggestions/IN");
        assert_eq!(config.request_timeout_ms, Some(2500));
        assert_eq!(config.indicator_period, 9);
        assert_eq!(config.label_offset.whole_minutes(), 330);
    }

    #[test]
    fn rejects_zero_indicator_period() {
        let err = ClientConfig::from_lookup(lookup_from(&[("TICKLINE_INDICATOR_PERIOD", "0")]))
            .expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::InvalidConfig {
                key: "TICKLINE_INDICATOR_PERIOD",
                ..
            }
        ));
    }
}
