// ABOUTME: Multi-service deployment manifest generation.
// ABOUTME: Compose-format output whose image tags and file name depend on the environment.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::{HealthcheckConfig, ServiceSpec, Settings};
use crate::types::{Environment, ImageRef, TagPair};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid healthcheck for {service}: {reason}")]
    InvalidHealthcheck { service: String, reason: String },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeManifest {
    pub services: BTreeMap<String, ManifestEntry>,
    pub networks: BTreeMap<String, NetworkSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestEntry {
    pub image: String,
    pub container_name: String,
    pub ports: Vec<String>,
    pub environment: Vec<String>,
    pub networks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<ManifestHealthcheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestHealthcheck {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<String>,
    pub interval: String,
    pub timeout: String,
    pub retries: u32,
    pub start_period: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSpec {
    pub driver: String,
}

/// `docker-compose.yml` for production, `docker-compose.{env}.yml` otherwise.
pub fn manifest_file_name(environment: &Environment) -> String {
    if environment.is_production() {
        "docker-compose.yml".to_string()
    } else {
        format!("docker-compose.{environment}.yml")
    }
}

/// Render a duration the way compose files spell them (`30s`, `1500ms`).
fn compose_duration(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

pub struct ManifestGenerator {
    registry: String,
    network: String,
    output_dir: PathBuf,
}

impl ManifestGenerator {
    pub fn new(registry: &str, network: &str, output_dir: &Path) -> Self {
        Self {
            registry: registry.to_string(),
            network: network.to_string(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.registry, &settings.network, &settings.manifest_dir)
    }

    pub fn manifest_path(&self, environment: &Environment) -> PathBuf {
        self.output_dir.join(manifest_file_name(environment))
    }

    /// Build the manifest in memory. Pure: the same inputs always give an equal manifest.
    pub fn build(
        &self,
        services: &[&ServiceSpec],
        environment: &Environment,
    ) -> Result<ComposeManifest, ManifestError> {
        let entries = services
            .iter()
            .map(|service| Ok((service.name.to_string(), self.entry(service, environment)?)))
            .collect::<Result<BTreeMap<_, _>, ManifestError>>()?;

        let mut networks = BTreeMap::new();
        networks.insert(
            self.network.clone(),
            NetworkSpec {
                driver: "bridge".to_string(),
            },
        );

        Ok(ComposeManifest {
            services: entries,
            networks,
        })
    }

    fn entry(
        &self,
        service: &ServiceSpec,
        environment: &Environment,
    ) -> Result<ManifestEntry, ManifestError> {
        let tags = TagPair::for_version(&service.version, environment);
        let image = ImageRef::new(&self.registry, &service.name, &tags.primary);

        let healthcheck = service
            .healthcheck
            .as_ref()
            .map(|hc| healthcheck_entry(service, hc))
            .transpose()?;

        Ok(ManifestEntry {
            image: image.to_string(),
            container_name: service.name.to_string(),
            ports: service.ports.clone(),
            environment: service.environment.clone(),
            networks: vec![self.network.clone()],
            healthcheck,
            env_file: service.env_file.clone(),
        })
    }

    /// Serialize and write the manifest, replacing any previous file.
    pub fn write(
        &self,
        manifest: &ComposeManifest,
        environment: &Environment,
    ) -> Result<PathBuf, ManifestError> {
        let path = self.manifest_path(environment);
        let yaml = serde_yaml::to_string(manifest)?;
        std::fs::write(&path, yaml).map_err(|source| ManifestError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(
            event = "manifest_generated",
            environment = %environment,
            path = %path.display(),
            "manifest generated"
        );
        Ok(path)
    }

    /// Build and write in one step, returning the written path.
    pub fn generate(
        &self,
        services: &[&ServiceSpec],
        environment: &Environment,
    ) -> Result<PathBuf, ManifestError> {
        let manifest = self.build(services, environment)?;
        self.write(&manifest, environment)
    }
}

fn healthcheck_entry(
    service: &ServiceSpec,
    hc: &HealthcheckConfig,
) -> Result<ManifestHealthcheck, ManifestError> {
    let test = match &hc.test {
        Some(test) => test
            .to_args()
            .map_err(|reason| ManifestError::InvalidHealthcheck {
                service: service.name.to_string(),
                reason,
            })?,
        None => Vec::new(),
    };

    Ok(ManifestHealthcheck {
        test,
        interval: compose_duration(hc.interval),
        timeout: compose_duration(hc.timeout),
        retries: hc.retries,
        start_period: compose_duration(hc.start_period),
    })
}
