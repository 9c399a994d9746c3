// ABOUTME: Entry point for the shipwright CLI application.
// ABOUTME: Loads the catalog, builds explicit settings, and dispatches to the orchestrator.

mod cli;

use clap::Parser;
use cli::Cli;
use shipwright::config::Catalog;
use shipwright::error::Result;
use shipwright::orchestrator::{Command, Orchestrator};
use shipwright::output::{Output, OutputMode};
use shipwright::process::{CommandRunner, ProcessRunner, RecordingRunner};
use shipwright::runtime::BollardProbe;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag when set
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let catalog = match &cli.config {
        Some(path) => Catalog::load(path)?,
        None => Catalog::discover(&cwd, cli.env.map(|e| e.as_str()))?,
    };
    if let Some(selector) = cli.env
        && selector.environment() != catalog.environment
    {
        tracing::warn!(
            selector = selector.as_str(),
            environment = %catalog.environment,
            "--env {} does not match the catalog environment '{}'; tags follow the catalog",
            selector.as_str(),
            catalog.environment
        );
    }
    let mut settings = catalog.settings(&cwd)?;
    // Nothing is pushed in a dry run, so the version record must not move.
    settings.persist_versions = !cli.dry_run;

    let command = Command::from(&cli.command);
    let runner: Box<dyn CommandRunner> = if cli.dry_run {
        output.progress("Dry run: commands are logged, not executed");
        Box::new(RecordingRunner::new())
    } else {
        Box::new(ProcessRunner)
    };
    let probe = BollardProbe::local(Some(settings.engine));

    output.progress(&format!(
        "Running {command} for {} ({})",
        settings.registry, settings.environment
    ));
    output.restart_clock();

    let orchestrator = Orchestrator::new(&settings, runner.as_ref(), &probe);
    let requested: Vec<String> = cli
        .services
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let report = orchestrator.run(&catalog, command, &requested).await?;

    output.report(command, &report);
    Ok(())
}
