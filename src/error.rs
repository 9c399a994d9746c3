// ABOUTME: Application-wide error types for shipwright.
// ABOUTME: Uses thiserror; pre-flight errors are separated from run-time failures.

use crate::manifest::ManifestError;
use crate::process::CommandError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("duplicate service in catalog: {0}")]
    DuplicateService(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("the following services do not exist: {}", .missing.join(", "))]
    ServiceNotFound { missing: Vec<String> },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Catalog missing or malformed. Raised before any external command runs.
    Configuration,
    /// The command token is not one the orchestrator knows.
    Usage,
    /// A requested service is absent from the catalog. Raised before any work starts.
    ServiceNotFound,
    /// An external process exited non-zero under the fail-fast policy.
    ExternalCommand,
    /// Manifest could not be serialized or written.
    Manifest,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigNotFound(_)
            | Error::InvalidConfig(_)
            | Error::DuplicateService(_)
            | Error::MissingEnvVar(_)
            | Error::Yaml(_) => ErrorKind::Configuration,
            Error::UnknownCommand(_) => ErrorKind::Usage,
            Error::ServiceNotFound { .. } => ErrorKind::ServiceNotFound,
            Error::Command(_) => ErrorKind::ExternalCommand,
            Error::Manifest(_) => ErrorKind::Manifest,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Pre-flight errors abort before anything touches the build tool or container engine.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::Usage | ErrorKind::ServiceNotFound
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
