// ABOUTME: Integration tests for command dispatch over the selected services.
// ABOUTME: Checks step order per command, pre-flight selection, and non-fatal test skipping.

mod support;

use shipwright::config::TestCredentials;
use shipwright::diagnostics::WarningKind;
use shipwright::error::ErrorKind;
use shipwright::orchestrator::{Command, Orchestrator};
use shipwright::process::RecordingRunner;
use std::fs;
use support::catalog_in;
use support::fake_probe::{FakeProbe, Script};

const CATALOG: &str = r#"
environment: staging
registry: acme
services_dir: services
build_tool: ["./mvnw"]
health_wait:
  retries: 2
services:
  - name: auth
    version: 2.1.5
    ports: ["8081:8080"]
  - name: search
"#;

fn credentials() -> TestCredentials {
    TestCredentials {
        api_key: "pmak-123".to_string(),
        collection: "smoke".to_string(),
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn unknown_service_fails_before_any_command() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, settings) = catalog_in(dir.path(), CATALOG);
    let runner = RecordingRunner::new();
    let probe = FakeProbe::new();
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let err = orchestrator
        .run(&catalog, Command::Build, &names(&["auth", "billing"]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceNotFound);
    assert!(err.to_string().contains("billing"));
    assert!(runner.commands().is_empty());
    assert!(!settings.version_file.exists());
}

#[tokio::test]
async fn compose_writes_the_manifest_without_running_anything() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, settings) = catalog_in(dir.path(), CATALOG);
    let runner = RecordingRunner::new();
    let probe = FakeProbe::new();
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let report = orchestrator.run(&catalog, Command::Compose, &[]).await.unwrap();

    let path = report.manifest.unwrap();
    assert_eq!(path, dir.path().join("docker-compose.staging.yml"));
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("acme/auth:2.1.5-staging"));
    assert!(content.contains("acme/search:staging-latest"));
    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn up_generates_then_applies_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, settings) = catalog_in(dir.path(), CATALOG);
    let runner = RecordingRunner::new();
    let probe = FakeProbe::new();
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    orchestrator.run(&catalog, Command::Up, &[]).await.unwrap();

    let manifest = dir.path().join("docker-compose.staging.yml");
    assert!(manifest.exists());
    assert_eq!(
        runner.command_lines(),
        [format!("docker-compose -f {} up -d", manifest.display())]
    );
    assert_eq!(runner.commands()[0].cwd(), Some(dir.path()));
}

#[tokio::test]
async fn compose_tool_with_subcommand_is_split_into_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = format!("compose_tool: docker compose\n{CATALOG}");
    let (catalog, settings) = catalog_in(dir.path(), &yaml);
    let runner = RecordingRunner::new();
    let probe = FakeProbe::new();
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    orchestrator.run(&catalog, Command::Down, &[]).await.unwrap();

    let commands = runner.commands();
    assert_eq!(commands[0].program(), "docker");
    assert_eq!(commands[0].get_args(), ["compose", "down"]);
}

#[tokio::test]
async fn down_uses_the_manifest_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, settings) = catalog_in(dir.path(), CATALOG);
    let runner = RecordingRunner::new();
    let probe = FakeProbe::new();
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    orchestrator.run(&catalog, Command::Down, &[]).await.unwrap();
    orchestrator.run(&catalog, Command::Compose, &[]).await.unwrap();
    orchestrator.run(&catalog, Command::Down, &[]).await.unwrap();

    let manifest = dir.path().join("docker-compose.staging.yml");
    assert_eq!(
        runner.command_lines(),
        [
            "docker-compose down".to_string(),
            format!("docker-compose -f {} down", manifest.display()),
        ]
    );
}

#[tokio::test]
async fn failed_compose_up_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, settings) = catalog_in(dir.path(), CATALOG);
    let runner = RecordingRunner::new();
    runner.fail_on("docker-compose", 1);
    let probe = FakeProbe::new();
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let err = orchestrator.run(&catalog, Command::Up, &[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalCommand);
}

#[tokio::test]
async fn test_runs_the_collection_once_everything_is_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, mut settings) = catalog_in(dir.path(), CATALOG);
    settings.test_credentials = Some(credentials());
    let runner = RecordingRunner::new();
    let probe = FakeProbe::new()
        .script("auth", Script::HealthyOnPoll(2))
        .script("search", Script::NoHealthcheck);
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let report = orchestrator.run(&catalog, Command::Test, &[]).await.unwrap();

    assert!(report.tests_ran);
    assert!(report.health.unwrap().all_healthy());
    assert_eq!(
        runner.commands()[0].get_args(),
        ["login", "--with-api-key", "pmak-123"]
    );
    assert_eq!(
        runner.command_lines(),
        [
            "postman login --with-api-key ***",
            "postman collection run smoke",
        ]
    );
}

#[tokio::test]
async fn health_timeout_skips_tests_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, mut settings) = catalog_in(dir.path(), CATALOG);
    settings.test_credentials = Some(credentials());
    let runner = RecordingRunner::new();
    let probe = FakeProbe::new()
        .script("auth", Script::Unhealthy)
        .script("search", Script::NoHealthcheck);
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let report = orchestrator.run(&catalog, Command::Test, &[]).await.unwrap();

    assert!(!report.tests_ran);
    assert_eq!(probe.polls("auth"), 2);
    assert_eq!(probe.polls("search"), 1);
    assert_eq!(report.diagnostics.count(WarningKind::HealthTimeout), 1);
    assert_eq!(report.diagnostics.count(WarningKind::TestsSkipped), 1);
    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn missing_credentials_skip_tests_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, settings) = catalog_in(dir.path(), CATALOG);
    let runner = RecordingRunner::new();
    let probe = FakeProbe::new()
        .script("auth", Script::NoHealthcheck)
        .script("search", Script::NoHealthcheck);
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let report = orchestrator.run(&catalog, Command::Test, &[]).await.unwrap();

    assert!(!report.tests_ran);
    assert_eq!(report.diagnostics.count(WarningKind::TestsSkipped), 1);
    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn failed_login_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, mut settings) = catalog_in(dir.path(), CATALOG);
    settings.test_credentials = Some(credentials());
    let runner = RecordingRunner::new();
    runner.fail_on("postman login", 1);
    let probe = FakeProbe::new()
        .script("auth", Script::NoHealthcheck)
        .script("search", Script::NoHealthcheck);
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let err = orchestrator.run(&catalog, Command::Test, &[]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalCommand);
    assert_eq!(runner.command_lines(), ["postman login --with-api-key ***"]);
}

#[tokio::test]
async fn deploy_builds_brings_up_and_tests_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = CATALOG.replace("environment: staging", "environment: production");
    let (catalog, mut settings) = catalog_in(dir.path(), &yaml);
    settings.test_credentials = Some(credentials());
    fs::write(&settings.version_file, "Service Versions\nauth:2.1.4\n").unwrap();
    let runner = RecordingRunner::new();
    // The previous release is still running when the build starts.
    let probe = FakeProbe::new().script("auth", Script::NoHealthcheck);
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let report = orchestrator
        .run(&catalog, Command::Deploy, &names(&["auth"]))
        .await
        .unwrap();

    assert_eq!(report.releases.len(), 1);
    assert_eq!(report.releases[0].image.to_string(), "acme/auth:2.1.5");
    assert_eq!(report.releases[0].alias.to_string(), "acme/auth:latest");
    assert!(report.tests_ran);

    let manifest = dir.path().join("docker-compose.yml");
    assert_eq!(report.manifest.as_deref(), Some(manifest.as_path()));
    assert_eq!(
        runner.command_lines(),
        [
            "./mvnw clean package".to_string(),
            "docker stop auth".to_string(),
            "docker rm auth".to_string(),
            "docker build -t acme/auth:2.1.5 .".to_string(),
            "docker tag acme/auth:2.1.5 acme/auth:latest".to_string(),
            "docker push acme/auth:2.1.5".to_string(),
            "docker push acme/auth:latest".to_string(),
            format!("docker-compose -f {} up -d", manifest.display()),
            "postman login --with-api-key ***".to_string(),
            "postman collection run smoke".to_string(),
        ]
    );

    let versions = fs::read_to_string(&settings.version_file).unwrap();
    assert!(versions.contains("auth:2.1.5"));
}

#[tokio::test]
async fn deploy_stops_when_the_build_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (catalog, settings) = catalog_in(dir.path(), CATALOG);
    let runner = RecordingRunner::new();
    runner.fail_on("./mvnw", 1);
    let probe = FakeProbe::new();
    let orchestrator = Orchestrator::new(&settings, &runner, &probe);

    let err = orchestrator.run(&catalog, Command::Deploy, &[]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalCommand);
    assert_eq!(runner.command_lines(), ["./mvnw clean package"]);
    assert!(!dir.path().join("docker-compose.staging.yml").exists());
}

#[tokio::test]
async fn build_tool_commands_map_to_phases() {
    let cases = [
        (Command::Package, "./mvnw clean package"),
        (Command::Verify, "./mvnw clean verify"),
        (Command::UnitTest, "./mvnw clean test"),
        (Command::Clean, "./mvnw clean"),
    ];

    for (command, expected) in cases {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, settings) = catalog_in(dir.path(), CATALOG);
        let runner = RecordingRunner::new();
        let probe = FakeProbe::new();
        let orchestrator = Orchestrator::new(&settings, &runner, &probe);

        let report = orchestrator
            .run(&catalog, command, &names(&["search", "auth"]))
            .await
            .unwrap();

        assert!(report.releases.is_empty(), "{command} should not publish");
        assert_eq!(runner.command_lines(), [expected, expected], "{command}");
        let order: Vec<_> = runner
            .commands()
            .iter()
            .map(|c| c.service_name().map(str::to_string))
            .collect();
        assert_eq!(
            order,
            [Some("search".to_string()), Some("auth".to_string())]
        );
    }
}
