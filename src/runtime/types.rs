// ABOUTME: Runtime type definitions for Docker and Podman.
// ABOUTME: Includes the engine selector and the container status seen by probes.

use serde::{Deserialize, Serialize};

/// The container engine. Also names the CLI used for build/tag/push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    #[default]
    Docker,
    Podman,
}

impl RuntimeType {
    pub fn binary(&self) -> &'static str {
        match self {
            RuntimeType::Docker => "docker",
            RuntimeType::Podman => "podman",
        }
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary())
    }
}

/// Detected runtime information.
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    /// The type of runtime detected.
    pub runtime_type: RuntimeType,
    /// Path to the runtime socket.
    pub socket_path: String,
}

/// Health probe status reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Starting,
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Starting => write!(f, "starting"),
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// A running container as seen by a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub name: String,
    /// `None` when the container declares no health check.
    pub health: Option<HealthState>,
}

impl ContainerStatus {
    /// Healthy, or running with no health check declared.
    pub fn is_ready(&self) -> bool {
        matches!(self.health, None | Some(HealthState::Healthy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_health_check_counts_as_ready() {
        let status = ContainerStatus {
            name: "auth".to_string(),
            health: None,
        };
        assert!(status.is_ready());
    }

    #[test]
    fn only_healthy_state_is_ready() {
        for (health, ready) in [
            (HealthState::Healthy, true),
            (HealthState::Starting, false),
            (HealthState::Unhealthy, false),
        ] {
            let status = ContainerStatus {
                name: "auth".to_string(),
                health: Some(health),
            };
            assert_eq!(status.is_ready(), ready, "{health}");
        }
    }
}
