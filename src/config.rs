use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_EXPORT_DIR: &str = ".";

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset keys take their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            endpoint: lookup("PREDICT_ENDPOINT").unwrap_or(defaults.endpoint),
            timeout: secs(&lookup, "PREDICT_TIMEOUT_SECS")?.unwrap_or(defaults.timeout),
            connect_timeout: secs(&lookup, "PREDICT_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(defaults.connect_timeout),
            export_dir: lookup("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
        })
    }
}

fn secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    let secs = u64::from_str(raw.trim()).map_err(|e| ConfigError {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError {
            key,
            value: raw,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Some(Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.endpoint, "http://localhost:8000/predict");
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("PREDICT_ENDPOINT", "https://api.example.com/predict"),
            ("PREDICT_TIMEOUT_SECS", "5"),
            ("EXPORT_DIR", "/tmp/reports"),
        ]))
        .unwrap();

        assert_eq!(cfg.endpoint, "https://api.example.com/predict");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(10));
        assert_eq!(cfg.export_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Config::from_lookup(lookup(&[("PREDICT_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.key, "PREDICT_TIMEOUT_SECS");

        let err = Config::from_lookup(lookup(&[("PREDICT_TIMEOUT_SECS", "0")])).unwrap_err();
        assert_eq!(err.reason, "must be greater than zero");
    }
}
