// ABOUTME: Runtime probe error types with SNAFU pattern.
// ABOUTME: Unifies detection, connection, and query failures.

use snafu::Snafu;

use super::detection::DetectionError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProbeError {
    #[snafu(display("runtime detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("failed to connect to {socket}: {source}"))]
    Connect {
        socket: String,
        source: bollard::errors::Error,
    },

    #[snafu(display("failed to list containers matching {service}: {source}"))]
    ListContainers {
        service: String,
        source: bollard::errors::Error,
    },

    #[snafu(display("failed to inspect {target}: {source}"))]
    Inspect {
        target: String,
        source: bollard::errors::Error,
    },

    #[snafu(display("runtime unavailable: {message}"))]
    Unavailable { message: String },
}

impl From<DetectionError> for ProbeError {
    fn from(source: DetectionError) -> Self {
        ProbeError::Detection { source }
    }
}
