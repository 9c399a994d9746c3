// ABOUTME: Bollard-based container runtime probe.
// ABOUTME: Supports both Docker and Podman via the Docker-compatible API.

use super::detection::detect_local;
use super::error::{ConnectSnafu, InspectSnafu, ListContainersSnafu};
use super::{ContainerProbe, ContainerStatus, HealthState, ProbeError, RuntimeType};
use crate::types::ImageRef;
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::HealthStatusEnum;
use bollard::query_parameters::{InspectContainerOptions, ListContainersOptions};
use snafu::ResultExt;
use std::collections::HashMap;
use tokio::sync::OnceCell;

/// Probe backed by the local runtime socket.
///
/// The socket is detected and the client created on first use, so commands
/// that never query the runtime never need one.
pub struct BollardProbe {
    engine: Option<RuntimeType>,
    client: OnceCell<Docker>,
}

impl BollardProbe {
    /// Probe the local runtime, restricted to `engine` when given.
    pub fn local(engine: Option<RuntimeType>) -> Self {
        Self {
            engine,
            client: OnceCell::new(),
        }
    }

    /// Probe through an already connected client.
    pub fn with_client(client: Docker) -> Self {
        Self {
            engine: None,
            client: OnceCell::new_with(Some(client)),
        }
    }

    async fn client(&self) -> Result<&Docker, ProbeError> {
        self.client
            .get_or_try_init(|| async {
                let info = detect_local(self.engine).map_err(ProbeError::from)?;
                tracing::debug!(
                    runtime = %info.runtime_type,
                    socket = %info.socket_path,
                    "connecting to container runtime"
                );
                Docker::connect_with_unix(&info.socket_path, 120, bollard::API_DEFAULT_VERSION)
                    .context(ConnectSnafu {
                        socket: info.socket_path.clone(),
                    })
            })
            .await
    }
}

fn map_health(status: HealthStatusEnum) -> Option<HealthState> {
    match status {
        HealthStatusEnum::STARTING => Some(HealthState::Starting),
        HealthStatusEnum::HEALTHY => Some(HealthState::Healthy),
        HealthStatusEnum::UNHEALTHY => Some(HealthState::Unhealthy),
        _ => None,
    }
}

#[async_trait]
impl ContainerProbe for BollardProbe {
    async fn running_container(
        &self,
        service: &str,
    ) -> Result<Option<ContainerStatus>, ProbeError> {
        let client = self.client().await?;

        let mut filters: HashMap<String, Vec<String>> = HashMap::new();
        filters.insert("name".to_string(), vec![service.to_string()]);
        let opts = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let containers = client
            .list_containers(Some(opts))
            .await
            .context(ListContainersSnafu { service })?;

        // The runtime's name filter is a pattern match; keep the substring rule explicit.
        let found = containers.into_iter().find_map(|c| {
            let id = c.id?;
            let name = c
                .names
                .unwrap_or_default()
                .into_iter()
                .map(|n| n.trim_start_matches('/').to_string())
                .find(|n| n.contains(service))?;
            Some((id, name))
        });

        let Some((id, name)) = found else {
            return Ok(None);
        };

        let details = client
            .inspect_container(&id, None::<InspectContainerOptions>)
            .await
            .context(InspectSnafu { target: name.clone() })?;

        let state = details.state.as_ref();
        if !state.and_then(|s| s.running).unwrap_or(false) {
            return Ok(None);
        }

        let health = state
            .and_then(|s| s.health.as_ref())
            .and_then(|h| h.status)
            .and_then(map_health);

        Ok(Some(ContainerStatus { name, health }))
    }

    async fn image_exists(&self, image: &ImageRef) -> Result<bool, ProbeError> {
        let client = self.client().await?;
        let image_name = image.to_string();

        match client.inspect_image(&image_name).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(source) => Err(ProbeError::Inspect {
                target: image_name,
                source,
            }),
        }
    }
}
