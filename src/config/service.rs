// ABOUTME: One entry of the service catalog.
// ABOUTME: Everything the pipeline and manifest generator need to know about a service.

use serde::Deserialize;

use super::HealthcheckConfig;
use super::deserialize::{deserialize_env_list, deserialize_scalars};
use crate::types::{ServiceName, Version};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceSpec {
    pub name: ServiceName,

    #[serde(default)]
    pub version: Version,

    #[serde(default, deserialize_with = "deserialize_scalars")]
    pub ports: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_env_list")]
    pub environment: Vec<String>,

    #[serde(default)]
    pub env_file: Option<String>,

    #[serde(default)]
    pub healthcheck: Option<HealthcheckConfig>,
}

impl ServiceSpec {
    /// A bare service at version `latest` with nothing else declared.
    pub fn new(name: ServiceName) -> Self {
        Self {
            name,
            version: Version::Latest,
            ports: Vec::new(),
            environment: Vec::new(),
            env_file: None,
            healthcheck: None,
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}
