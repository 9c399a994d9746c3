// ABOUTME: Read-only view of the container runtime.
// ABOUTME: Running-state, health, and image-existence queries used by the pipeline and health waiter.

mod bollard_probe;
mod detection;
mod error;
mod types;

pub use bollard_probe::BollardProbe;
pub use detection::{DetectionError, detect_local};
pub use error::ProbeError;
pub use types::{ContainerStatus, HealthState, RuntimeInfo, RuntimeType};

use crate::types::ImageRef;
use async_trait::async_trait;

/// Queries the core needs from the container runtime. Nothing here mutates state.
#[async_trait]
pub trait ContainerProbe: Send + Sync {
    /// The first running container whose name contains `service`, if any.
    async fn running_container(&self, service: &str)
    -> Result<Option<ContainerStatus>, ProbeError>;

    /// Whether an image with this exact reference exists locally.
    async fn image_exists(&self, image: &ImageRef) -> Result<bool, ProbeError>;
}
