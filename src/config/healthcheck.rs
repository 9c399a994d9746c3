// ABOUTME: Container health check declared for a service in the catalog.
// ABOUTME: Missing fields fall back to compose-style defaults.

use serde::Deserialize;
use std::time::Duration;

use super::deserialize::scalar_to_string;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthcheckConfig {
    #[serde(default)]
    pub test: Option<HealthTest>,

    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_start_period", with = "humantime_serde")]
    pub start_period: Duration,
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self {
            test: None,
            interval: default_interval(),
            timeout: default_timeout(),
            retries: default_retries(),
            start_period: default_start_period(),
        }
    }
}

/// Health probe command: a shell string or an exec-form list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HealthTest {
    Shell(String),
    Exec(Vec<serde_yaml::Value>),
}

impl HealthTest {
    /// Exec-form entries, every element coerced to a string.
    pub fn to_args(&self) -> Result<Vec<String>, String> {
        match self {
            HealthTest::Shell(cmd) => Ok(vec!["CMD-SHELL".to_string(), cmd.clone()]),
            HealthTest::Exec(values) => values.iter().map(scalar_to_string).collect(),
        }
    }
}

fn default_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_retries() -> u32 {
    3
}

fn default_start_period() -> Duration {
    Duration::from_secs(10)
}
