//! Configuration schema for muck
//!
//! Configuration is read from `.muck.toml` at the project root

use crate::error::{MuckError, MuckResult};
use crate::fetch::FetchOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Defaults for remote fetches
    pub fetch: FetchConfig,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

impl GeneralConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Fetch defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: f64,

    /// Pause after each download, in seconds
    pub delay_secs: f64,

    /// Width of the random range around `delay_secs`
    pub delay_jitter_secs: f64,

    /// Status code that counts as success
    pub expected_status: u16,

    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 4.0,
            delay_secs: 0.0,
            delay_jitter_secs: 0.0,
            expected_status: 200,
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    /// Fetch options carrying these defaults
    pub fn to_options(&self) -> MuckResult<FetchOptions> {
        let timeout = Duration::try_from_secs_f64(self.timeout_secs).map_err(|e| {
            MuckError::invalid(format!("fetch.timeout_secs = {}: {}", self.timeout_secs, e))
        })?;
        let options = FetchOptions {
            expected_status: self.expected_status,
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            timeout,
            delay: self.delay_secs,
            delay_jitter: self.delay_jitter_secs,
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[fetch]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.general.json_logs());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [fetch]
            delay_secs = 1.5

            [fetch.headers]
            User-Agent = "muck"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.fetch.delay_secs, 1.5);
        assert_eq!(config.fetch.timeout_secs, 4.0); // default preserved

        let options = config.fetch.to_options().unwrap();
        assert_eq!(options.timeout, Duration::from_secs(4));
        assert_eq!(
            options.headers,
            vec![("User-Agent".to_string(), "muck".to_string())]
        );
    }

    #[test]
    fn unusable_fetch_values_rejected() {
        for fetch in [
            FetchConfig {
                timeout_secs: -1.0,
                ..FetchConfig::default()
            },
            FetchConfig {
                timeout_secs: f64::NAN,
                ..FetchConfig::default()
            },
            FetchConfig {
                delay_secs: 1e300,
                ..FetchConfig::default()
            },
        ] {
            assert!(matches!(
                fetch.to_options(),
                Err(MuckError::InvalidArgument(_))
            ));
        }
    }
}
