// ABOUTME: Service catalog types and parsing.
// ABOUTME: Handles YAML loading, validation, service selection, and settings resolution.

mod deserialize;
mod env_value;
mod healthcheck;
mod service;
mod settings;

pub use env_value::{EnvValue, resolve_optional};
pub use healthcheck::{HealthTest, HealthcheckConfig};
pub use service::ServiceSpec;
pub use settings::{Settings, TestCredentials, default_build_tool};

use crate::error::{Error, Result};
use crate::health::RetryPolicy;
use crate::runtime::RuntimeType;
use crate::types::Environment;
use deserialize::{deserialize_command, deserialize_services};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_DIR: &str = "build-config";
pub const DEFAULT_NETWORK: &str = "app-network";
pub const DEFAULT_COMPOSE_TOOL: &str = "docker-compose";
pub const DEFAULT_VERSION_FILE: &str = "versions.txt";

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub environment: Environment,

    pub registry: String,

    #[serde(default = "default_network")]
    pub network: String,

    #[serde(deserialize_with = "deserialize_services")]
    pub services: NonEmpty<ServiceSpec>,

    #[serde(default)]
    pub test_runner: TestRunnerConfig,

    #[serde(default)]
    pub health_wait: HealthWaitConfig,

    #[serde(default)]
    pub engine: RuntimeType,

    #[serde(default, deserialize_with = "deserialize_build_tool")]
    pub build_tool: Option<NonEmpty<String>>,

    #[serde(default = "default_compose_tool")]
    pub compose_tool: String,

    #[serde(default)]
    pub services_dir: Option<PathBuf>,

    #[serde(default)]
    pub version_file: Option<PathBuf>,

    #[serde(default)]
    pub manifest_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestRunnerConfig {
    #[serde(default)]
    pub api_key: Option<EnvValue>,
    #[serde(default)]
    pub collection: Option<EnvValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthWaitConfig {
    #[serde(default = "default_wait_retries")]
    pub retries: u32,
    #[serde(default = "default_wait_delay", with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for HealthWaitConfig {
    fn default() -> Self {
        Self {
            retries: default_wait_retries(),
            delay: default_wait_delay(),
        }
    }
}

fn default_network() -> String {
    DEFAULT_NETWORK.to_string()
}

fn default_compose_tool() -> String {
    DEFAULT_COMPOSE_TOOL.to_string()
}

fn default_wait_retries() -> u32 {
    10
}

fn default_wait_delay() -> Duration {
    Duration::from_secs(10)
}

fn deserialize_build_tool<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NonEmpty<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_command(deserializer).map(Some)
}

/// Catalog file for an environment selector (`dev`, `staging`, `prod`).
/// Any other selector, or none, falls back to `services.yml`.
pub fn catalog_path(dir: &Path, selector: Option<&str>) -> PathBuf {
    let file = match selector {
        Some("dev") => "services-dev.yml",
        Some("staging") => "services-staging.yml",
        Some("prod") => "services-prod.yml",
        _ => "services.yml",
    };
    dir.join(CONFIG_DIR).join(file)
}

impl Catalog {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        tracing::info!(path = %path.display(), "using configuration file");
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path, selector: Option<&str>) -> Result<Self> {
        Self::load(&catalog_path(dir, selector))
    }

    fn validate(&self) -> Result<()> {
        if self.registry.trim().is_empty() {
            return Err(Error::InvalidConfig("registry cannot be empty".to_string()));
        }
        if self.network.trim().is_empty() {
            return Err(Error::InvalidConfig("network cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(service.name.as_str()) {
                return Err(Error::DuplicateService(service.name.to_string()));
            }
        }

        for service in &self.services {
            if let Some(test) = service.healthcheck.as_ref().and_then(|h| h.test.as_ref()) {
                test.to_args().map_err(|e| {
                    Error::InvalidConfig(format!("{}: healthcheck test: {}", service.name, e))
                })?;
            }
        }
        Ok(())
    }

    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name.as_str() == name)
    }

    /// Resolve a requested subset against the catalog.
    ///
    /// An empty request selects every service in catalog order. Otherwise every
    /// requested name must exist; all missing names are reported together and
    /// nothing is selected.
    pub fn select(&self, requested: &[String]) -> Result<Vec<&ServiceSpec>> {
        if requested.is_empty() {
            return Ok(self.services.iter().collect());
        }

        let missing: Vec<String> = requested
            .iter()
            .filter(|name| self.service(name).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::ServiceNotFound { missing });
        }

        let mut seen = HashSet::new();
        Ok(requested
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .filter_map(|name| self.service(name))
            .collect())
    }

    /// Resolve everything a run needs into explicit settings.
    ///
    /// Relative paths are anchored at `base_dir`. Test runner credentials are
    /// looked up here, once; an unset variable without a default leaves them
    /// unconfigured and only the test step is skipped.
    pub fn settings(&self, base_dir: &Path) -> Result<Settings> {
        let anchor = |p: &Option<PathBuf>, fallback: &str| -> PathBuf {
            match p {
                Some(p) if p.is_absolute() => p.clone(),
                Some(p) => base_dir.join(p),
                None if fallback == "." => base_dir.to_path_buf(),
                None => base_dir.join(fallback),
            }
        };

        let api_key = resolve_optional(self.test_runner.api_key.as_ref())?;
        let collection = resolve_optional(self.test_runner.collection.as_ref())?;
        let test_credentials = match (api_key, collection) {
            (Some(api_key), Some(collection)) => Some(TestCredentials {
                api_key,
                collection,
            }),
            _ => None,
        };

        Ok(Settings {
            environment: self.environment.clone(),
            registry: self.registry.clone(),
            network: self.network.clone(),
            engine: self.engine,
            build_tool: self.build_tool.clone().unwrap_or_else(default_build_tool),
            compose_tool: self.compose_tool.clone(),
            services_dir: anchor(&self.services_dir, "."),
            version_file: anchor(&self.version_file, DEFAULT_VERSION_FILE),
            manifest_dir: anchor(&self.manifest_dir, "."),
            retry: RetryPolicy::new(self.health_wait.retries, self.health_wait.delay),
            test_credentials,
            persist_versions: true,
        })
    }
}
