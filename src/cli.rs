// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Global flags select the catalog and services; subcommands name the operation.

use clap::{Parser, Subcommand, ValueEnum};
use shipwright::orchestrator::Command;
use shipwright::types::Environment;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shipwright")]
#[command(about = "Build, containerize, publish, and deploy a catalog of services")]
#[command(version)]
pub struct Cli {
    /// Catalog file to use instead of the one picked by --env
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment selector for catalog discovery
    #[arg(short, long, value_enum, global = true)]
    pub env: Option<EnvSelector>,

    /// Comma-separated subset of services (default: all)
    #[arg(short, long, env = "SERVICES", value_delimiter = ',', global = true)]
    pub services: Vec<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output: only the final result and warnings
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log commands instead of executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvSelector {
    Dev,
    Staging,
    Prod,
}

impl EnvSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvSelector::Dev => "dev",
            EnvSelector::Staging => "staging",
            EnvSelector::Prod => "prod",
        }
    }

    /// The catalog environment this selector is expected to pick.
    pub fn environment(&self) -> Environment {
        match self {
            EnvSelector::Dev => Environment::Development,
            EnvSelector::Staging => Environment::Staging,
            EnvSelector::Prod => Environment::Production,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Package, version, build, and push images for the selected services
    Build,

    /// Build, bring the deployment up, then run integration tests
    Deploy,

    /// Generate the deployment manifest
    Compose,

    /// Generate the manifest and start every container
    Up,

    /// Stop the deployment
    Down,

    /// Wait for services to be healthy, then run integration tests
    Test,

    /// Run the build tool's package phase
    Package,

    /// Run the build tool's verify phase
    Verify,

    /// Run the build tool's unit tests
    UnitTest,

    /// Run the build tool's clean phase
    Clean,
}

impl From<&Commands> for Command {
    fn from(command: &Commands) -> Self {
        match command {
            Commands::Build => Command::Build,
            Commands::Deploy => Command::Deploy,
            Commands::Compose => Command::Compose,
            Commands::Up => Command::Up,
            Commands::Down => Command::Down,
            Commands::Test => Command::Test,
            Commands::Package => Command::Package,
            Commands::Verify => Command::Verify,
            Commands::UnitTest => Command::UnitTest,
            Commands::Clean => Command::Clean,
        }
    }
}
