// ABOUTME: Per-service build, containerize, and publish pipeline.
// ABOUTME: Fail-fast through the command runner; versions are persisted after every service.

use std::time::Instant;

use crate::config::{ServiceSpec, Settings};
use crate::diagnostics::{Diagnostics, Warning};
use crate::process::{CommandError, CommandRunner, CommandSpec, ErrorPolicy, run};
use crate::runtime::ContainerProbe;
use crate::types::{DEFAULT_VERSION, ImageRef, TagPair, increment_patch};
use crate::versions::{VersionRecord, VersionStore};

/// A build tool lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Package,
    Verify,
    Test,
    Clean,
}

impl BuildPhase {
    /// Goals passed to the build tool.
    pub fn goals(&self) -> &'static [&'static str] {
        match self {
            BuildPhase::Package => &["clean", "package"],
            BuildPhase::Verify => &["clean", "verify"],
            BuildPhase::Test => &["clean", "test"],
            BuildPhase::Clean => &["clean"],
        }
    }

    pub fn event(&self) -> &'static str {
        match self {
            BuildPhase::Package => "build_service",
            BuildPhase::Verify => "verify_service",
            BuildPhase::Test => "test_service",
            BuildPhase::Clean => "clean_service",
        }
    }
}

/// What one successful build published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub service: String,
    pub version: String,
    pub image: ImageRef,
    pub alias: ImageRef,
}

pub struct Pipeline<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    probe: &'a dyn ContainerProbe,
    store: VersionStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        probe: &'a dyn ContainerProbe,
    ) -> Self {
        Self {
            settings,
            runner,
            probe,
            store: VersionStore::new(&settings.version_file),
        }
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    fn engine(&self, service: &str, event: &'static str) -> CommandSpec {
        CommandSpec::new(self.settings.engine.binary())
            .service(service)
            .event(event)
    }

    /// Run one build tool phase inside the service's build directory.
    pub async fn run_phase(
        &self,
        service: &ServiceSpec,
        phase: BuildPhase,
        diag: &mut Diagnostics,
    ) -> Result<(), CommandError> {
        let name = service.name.as_str();
        tracing::info!(service = %name, event = phase.event(), "running {:?} with build tool", phase);

        let tool = &self.settings.build_tool;
        let cmd = CommandSpec::new(tool.head.clone())
            .args(tool.tail.iter().cloned())
            .args(phase.goals().iter().copied())
            .current_dir(self.settings.service_dir(name))
            .service(name)
            .event(phase.event());
        run(self.runner, &cmd, ErrorPolicy::FailFast, diag).await?;
        Ok(())
    }

    /// Run a build tool phase for each service, stopping at the first failure.
    pub async fn run_phase_all(
        &self,
        services: &[&ServiceSpec],
        phase: BuildPhase,
        diag: &mut Diagnostics,
    ) -> Result<(), CommandError> {
        for service in services {
            tracing::info!(service = %service.name, event = "process_service", "processing");
            self.run_phase(service, phase, diag).await?;
        }
        Ok(())
    }

    /// Build, containerize, and publish one service, then persist its new version.
    ///
    /// `record` is the in-memory version record for the whole run; it is
    /// updated and flushed to disk only after both tags were pushed. A failed
    /// save is reported in `diag` and does not fail the build.
    pub async fn build_and_publish(
        &self,
        service: &ServiceSpec,
        record: &mut VersionRecord,
        diag: &mut Diagnostics,
    ) -> Result<Release, CommandError> {
        let name = service.name.as_str();
        let started = Instant::now();
        tracing::info!(service = %name, event = "process_service", "processing");

        self.run_phase(service, BuildPhase::Package, diag).await?;

        let current = record.get(name).unwrap_or(DEFAULT_VERSION);
        let version = increment_patch(current);
        let tags = TagPair::new(&version, &self.settings.environment);
        let image = ImageRef::new(&self.settings.registry, &service.name, &tags.primary);
        let alias = ImageRef::new(&self.settings.registry, &service.name, &tags.alias);

        self.remove_running_container(name, diag).await;
        for stale in [&image, &alias] {
            self.remove_image_if_present(name, stale, diag).await;
        }

        tracing::info!(service = %name, event = "docker_build_push", image = %image, "building image");
        let build_dir = self.settings.service_dir(name);
        let build = self
            .engine(name, "build_image")
            .args(["build", "-t"])
            .arg(image.to_string())
            .arg(".")
            .current_dir(&build_dir);
        run(self.runner, &build, ErrorPolicy::FailFast, diag).await?;

        let tag = self
            .engine(name, "tag_image")
            .arg("tag")
            .arg(image.to_string())
            .arg(alias.to_string());
        run(self.runner, &tag, ErrorPolicy::FailFast, diag).await?;

        for (reference, event) in [(&image, "push_image"), (&alias, "push_image_latest")] {
            let push = self.engine(name, event).arg("push").arg(reference.to_string());
            run(self.runner, &push, ErrorPolicy::FailFast, diag).await?;
        }

        record.set(name, version.as_str());
        if !self.settings.persist_versions {
            tracing::info!(service = %name, %version, "version record left unchanged");
        } else if let Err(e) = self.store.write(record) {
            diag.warn(Warning::persistence(format!(
                "version bump for {name} to {version} not saved: {e}"
            )));
        }

        tracing::info!(
            service = %name,
            event = "process_service_success",
            %version,
            "processed in {:.2}s",
            started.elapsed().as_secs_f64()
        );

        Ok(Release {
            service: name.to_string(),
            version,
            image,
            alias,
        })
    }

    /// Build and publish each service in order, stopping at the first failure.
    ///
    /// Services already published keep their persisted version bump.
    pub async fn build_all(
        &self,
        services: &[&ServiceSpec],
        diag: &mut Diagnostics,
    ) -> Result<Vec<Release>, CommandError> {
        if self.settings.persist_versions
            && let Err(e) = self.store.initialize()
        {
            diag.warn(Warning::persistence(e.to_string()));
        }
        let mut record = match self.store.read() {
            Ok(record) => record,
            Err(e) => {
                diag.warn(Warning::persistence(format!(
                    "{e}; continuing from default versions"
                )));
                VersionRecord::new()
            }
        };

        let mut releases = Vec::with_capacity(services.len());
        for service in services {
            releases.push(self.build_and_publish(service, &mut record, diag).await?);
        }
        Ok(releases)
    }

    async fn remove_running_container(&self, name: &str, diag: &mut Diagnostics) {
        let running = match self.probe.running_container(name).await {
            Ok(status) => status.is_some(),
            Err(e) => {
                tracing::warn!(service = %name, "could not query running containers: {}", e);
                true
            }
        };
        if !running {
            return;
        }

        tracing::info!(service = %name, event = "docker_cleanup", "stopping and removing container");
        for (action, event) in [("stop", "stop_container"), ("rm", "remove_container")] {
            let cmd = self.engine(name, event).arg(action).arg(name);
            // Ignore policy never produces an error.
            let _ = run(self.runner, &cmd, ErrorPolicy::Ignore, diag).await;
        }
    }

    async fn remove_image_if_present(&self, name: &str, image: &ImageRef, diag: &mut Diagnostics) {
        let exists = match self.probe.image_exists(image).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(service = %name, image = %image, "could not query image: {}", e);
                true
            }
        };
        if !exists {
            return;
        }

        let cmd = self
            .engine(name, "remove_image")
            .arg("rmi")
            .arg(image.to_string());
        let _ = run(self.runner, &cmd, ErrorPolicy::Ignore, diag).await;
    }
}
