// ABOUTME: Local container runtime socket detection.
// ABOUTME: Checks Podman sockets first, then Docker, honouring a configured engine.

use super::types::{RuntimeInfo, RuntimeType};
use std::path::Path;

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked Podman and Docker sockets)")]
    NoRuntimeFound,

    #[error("no {0} socket found")]
    EngineNotFound(RuntimeType),
}

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Detect a container runtime socket on the local system.
///
/// With `engine` set only that engine's sockets are considered. Otherwise the
/// order is:
/// 1. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 2. Rootful Podman socket (`/run/podman/podman.sock`)
/// 3. Docker socket (`/var/run/docker.sock`)
pub fn detect_local(engine: Option<RuntimeType>) -> Result<RuntimeInfo, DetectionError> {
    let candidates = socket_candidates(get_uid().as_deref());

    candidates
        .into_iter()
        .filter(|(runtime_type, _)| engine.is_none_or(|e| e == *runtime_type))
        .find(|(_, socket)| Path::new(socket).exists())
        .map(|(runtime_type, socket_path)| RuntimeInfo {
            runtime_type,
            socket_path,
        })
        .ok_or(match engine {
            Some(e) => DetectionError::EngineNotFound(e),
            None => DetectionError::NoRuntimeFound,
        })
}

fn socket_candidates(uid: Option<&str>) -> Vec<(RuntimeType, String)> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(uid) = uid {
        candidates.push((
            RuntimeType::Podman,
            format!("/run/user/{}/podman/podman.sock", uid),
        ));
    }
    candidates.push((RuntimeType::Podman, ROOTFUL_PODMAN.to_string()));
    candidates.push((RuntimeType::Docker, DOCKER_SOCKET.to_string()));
    candidates
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_prefer_podman() {
        let candidates = socket_candidates(Some("1000"));
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].1, "/run/user/1000/podman/podman.sock");
        assert_eq!(candidates[2].0, RuntimeType::Docker);
    }

    #[test]
    fn without_uid_rootless_is_skipped() {
        let candidates = socket_candidates(None);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].1, ROOTFUL_PODMAN);
    }
}
