// ABOUTME: Command dispatcher composing the pipeline, manifest generator, and health waiter.
// ABOUTME: Each named command maps to a fixed sequence of steps over the selected services.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{Catalog, ServiceSpec, Settings};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::health::{HealthReport, HealthWaiter};
use crate::manifest::ManifestGenerator;
use crate::pipeline::{BuildPhase, Pipeline, Release};
use crate::process::{CommandRunner, CommandSpec, ErrorPolicy, run};
use crate::runtime::ContainerProbe;

/// External collection test runner.
pub const TEST_RUNNER: &str = "postman";

/// A named operation selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Build and publish every selected service.
    Build,
    /// Build, then generate and apply the manifest, then run integration tests.
    Deploy,
    /// Generate the manifest only.
    Compose,
    /// Generate and apply the manifest.
    Up,
    /// Tear the deployment down.
    Down,
    /// Wait for health, then run integration tests.
    Test,
    /// Build tool phases; no versioning or image work.
    Package,
    Verify,
    UnitTest,
    Clean,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::Build,
        Command::Deploy,
        Command::Compose,
        Command::Up,
        Command::Down,
        Command::Test,
        Command::Package,
        Command::Verify,
        Command::UnitTest,
        Command::Clean,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Build => "build",
            Command::Deploy => "deploy",
            Command::Compose => "compose",
            Command::Up => "up",
            Command::Down => "down",
            Command::Test => "test",
            Command::Package => "package",
            Command::Verify => "verify",
            Command::UnitTest => "unit-test",
            Command::Clean => "clean",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Command::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}

/// Everything a run produced, including non-fatal warnings.
#[derive(Debug, Default)]
pub struct RunReport {
    pub releases: Vec<Release>,
    pub manifest: Option<PathBuf>,
    pub health: Option<HealthReport>,
    pub tests_ran: bool,
    pub diagnostics: Diagnostics,
}

pub struct Orchestrator<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    probe: &'a dyn ContainerProbe,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        probe: &'a dyn ContainerProbe,
    ) -> Self {
        Self {
            settings,
            runner,
            probe,
        }
    }

    /// Select services from `catalog` and execute `command` on them.
    ///
    /// Selection happens first: an unknown service name fails the run before
    /// any external command is issued.
    pub async fn run(
        &self,
        catalog: &Catalog,
        command: Command,
        requested: &[String],
    ) -> Result<RunReport> {
        let services = catalog.select(requested)?;
        self.execute(command, &services).await
    }

    pub async fn execute(&self, command: Command, services: &[&ServiceSpec]) -> Result<RunReport> {
        let mut report = RunReport::default();
        tracing::info!(
            command = %command,
            environment = %self.settings.environment,
            services = services.len(),
            "starting"
        );

        match command {
            Command::Build => self.build(services, &mut report).await?,
            Command::Deploy => {
                self.build(services, &mut report).await?;
                self.up(services, &mut report).await?;
                self.test(services, &mut report).await?;
                tracing::info!(event = "deployment_complete", "deployment complete");
            }
            Command::Compose => {
                self.compose(services, &mut report)?;
            }
            Command::Up => self.up(services, &mut report).await?,
            Command::Down => self.down(&mut report).await?,
            Command::Test => self.test(services, &mut report).await?,
            Command::Package => self.phase(services, BuildPhase::Package, &mut report).await?,
            Command::Verify => self.phase(services, BuildPhase::Verify, &mut report).await?,
            Command::UnitTest => self.phase(services, BuildPhase::Test, &mut report).await?,
            Command::Clean => self.phase(services, BuildPhase::Clean, &mut report).await?,
        }

        Ok(report)
    }

    fn pipeline(&self) -> Pipeline<'a> {
        Pipeline::new(self.settings, self.runner, self.probe)
    }

    async fn phase(
        &self,
        services: &[&ServiceSpec],
        phase: BuildPhase,
        report: &mut RunReport,
    ) -> Result<()> {
        self.pipeline()
            .run_phase_all(services, phase, &mut report.diagnostics)
            .await?;
        Ok(())
    }

    async fn build(&self, services: &[&ServiceSpec], report: &mut RunReport) -> Result<()> {
        let releases = self
            .pipeline()
            .build_all(services, &mut report.diagnostics)
            .await?;
        report.releases.extend(releases);
        Ok(())
    }

    fn compose(&self, services: &[&ServiceSpec], report: &mut RunReport) -> Result<PathBuf> {
        let generator = ManifestGenerator::from_settings(self.settings);
        let path = generator.generate(services, &self.settings.environment)?;
        report.manifest = Some(path.clone());
        Ok(path)
    }

    fn compose_command(&self, event: &'static str) -> CommandSpec {
        let mut parts = self.settings.compose_tool.split_whitespace();
        let program = parts.next().unwrap_or(crate::config::DEFAULT_COMPOSE_TOOL);
        CommandSpec::new(program)
            .args(parts)
            .current_dir(&self.settings.manifest_dir)
            .event(event)
    }

    async fn up(&self, services: &[&ServiceSpec], report: &mut RunReport) -> Result<()> {
        let path = self.compose(services, report)?;
        tracing::info!(event = "docker_compose_up", "bringing up containers");
        let cmd = self
            .compose_command("docker_compose_up")
            .arg("-f")
            .arg(path.display().to_string())
            .args(["up", "-d"]);
        run(self.runner, &cmd, ErrorPolicy::FailFast, &mut report.diagnostics).await?;
        Ok(())
    }

    async fn down(&self, report: &mut RunReport) -> Result<()> {
        tracing::info!(event = "docker_compose_down", "bringing down containers");
        let generator = ManifestGenerator::from_settings(self.settings);
        let path = generator.manifest_path(&self.settings.environment);

        let mut cmd = self.compose_command("docker_compose_down");
        if path.exists() {
            cmd = cmd.arg("-f").arg(path.display().to_string());
        }
        run(
            self.runner,
            &cmd.arg("down"),
            ErrorPolicy::FailFast,
            &mut report.diagnostics,
        )
        .await?;
        Ok(())
    }

    /// Wait for every selected service, then run the collection tests if all are healthy.
    ///
    /// Health timeouts and missing credentials skip the tests without failing the run.
    async fn test(&self, services: &[&ServiceSpec], report: &mut RunReport) -> Result<()> {
        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        let waiter = HealthWaiter::new(self.probe, self.settings.retry);
        let health = waiter.wait_for_all_services(&names).await;

        for service in &health.timed_out {
            report.diagnostics.warn(Warning::health_timeout(format!(
                "{service} did not become healthy after {} attempts",
                self.settings.retry.max_retries
            )));
        }

        let all_healthy = health.all_healthy();
        report.health = Some(health);

        if !all_healthy {
            tracing::error!("integration tests aborted: not every service is healthy");
            report
                .diagnostics
                .warn(Warning::tests_skipped("services not healthy"));
            return Ok(());
        }

        let Some(credentials) = &self.settings.test_credentials else {
            tracing::error!("integration tests aborted: missing API key or collection");
            report
                .diagnostics
                .warn(Warning::tests_skipped("missing test runner API key or collection"));
            return Ok(());
        };

        tracing::info!(event = "postman_login", "logging in to test runner");
        let login = CommandSpec::new(TEST_RUNNER)
            .args(["login", "--with-api-key"])
            .secret_arg(credentials.api_key.as_str())
            .event("postman_login");
        run(self.runner, &login, ErrorPolicy::FailFast, &mut report.diagnostics).await?;

        tracing::info!(event = "test_services", "running collection tests");
        let collection = CommandSpec::new(TEST_RUNNER)
            .args(["collection", "run"])
            .arg(credentials.collection.as_str())
            .event("test_services");
        run(
            self.runner,
            &collection,
            ErrorPolicy::FailFast,
            &mut report.diagnostics,
        )
        .await?;

        report.tests_ran = true;
        tracing::info!("integration tests completed");
        Ok(())
    }
}
