// ABOUTME: Resolved, explicitly constructed run settings.
// ABOUTME: Passed into every component instead of ambient globals or env lookups.

use nonempty::NonEmpty;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::health::RetryPolicy;
use crate::runtime::RuntimeType;
use crate::types::Environment;

/// Credentials for the external collection test runner.
#[derive(Clone, PartialEq, Eq)]
pub struct TestCredentials {
    pub api_key: String,
    pub collection: String,
}

impl fmt::Debug for TestCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCredentials")
            .field("api_key", &"***")
            .field("collection", &self.collection)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    /// Image namespace, e.g. `acme` in `acme/auth:1.0.1`.
    pub registry: String,
    /// The single bridge network every manifest entry joins.
    pub network: String,
    /// Container engine CLI used for build/tag/push/stop/rm/rmi.
    pub engine: RuntimeType,
    /// Build tool program followed by any leading arguments.
    pub build_tool: NonEmpty<String>,
    pub compose_tool: String,
    /// Parent directory of the per-service build directories.
    pub services_dir: PathBuf,
    pub version_file: PathBuf,
    /// Where generated manifests are written.
    pub manifest_dir: PathBuf,
    pub retry: RetryPolicy,
    pub test_credentials: Option<TestCredentials>,
    /// When false the version file is read but never created or rewritten.
    pub persist_versions: bool,
}

impl Settings {
    /// Defaults rooted at `base_dir`. Mostly useful for tests and tooling.
    pub fn new(base_dir: &Path, environment: Environment, registry: &str) -> Self {
        Self {
            environment,
            registry: registry.to_string(),
            network: super::DEFAULT_NETWORK.to_string(),
            engine: RuntimeType::Docker,
            build_tool: default_build_tool(),
            compose_tool: super::DEFAULT_COMPOSE_TOOL.to_string(),
            services_dir: base_dir.to_path_buf(),
            version_file: base_dir.join(super::DEFAULT_VERSION_FILE),
            manifest_dir: base_dir.to_path_buf(),
            retry: RetryPolicy::new(10, Duration::from_secs(10)),
            test_credentials: None,
            persist_versions: true,
        }
    }

    /// Build directory for a service.
    pub fn service_dir(&self, service: &str) -> PathBuf {
        self.services_dir.join(service)
    }
}

pub fn default_build_tool() -> NonEmpty<String> {
    if cfg!(windows) {
        NonEmpty::new("mvnw.cmd".to_string())
    } else {
        NonEmpty::new("./mvnw".to_string())
    }
}
