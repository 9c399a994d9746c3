// ABOUTME: Scripted ContainerProbe for tests.
// ABOUTME: Counts polls per service and answers from a fixed health script.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use shipwright::runtime::{ContainerProbe, ContainerStatus, HealthState, ProbeError};
use shipwright::types::ImageRef;

/// How a service's container behaves across polls.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Reports `starting` until the given poll (1-based), then `healthy`.
    HealthyOnPoll(usize),
    /// Running without a declared health check.
    NoHealthcheck,
    /// Running and permanently unhealthy.
    Unhealthy,
}

#[derive(Default)]
pub struct FakeProbe {
    scripts: HashMap<String, Script>,
    images: HashSet<String>,
    unavailable: bool,
    polls: Mutex<HashMap<String, usize>>,
    image_queries: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe whose every query fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn script(mut self, service: &str, script: Script) -> Self {
        self.scripts.insert(service.to_string(), script);
        self
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.images.insert(image.to_string());
        self
    }

    pub fn polls(&self, service: &str) -> usize {
        self.polls.lock().get(service).copied().unwrap_or(0)
    }

    pub fn image_queries(&self) -> Vec<String> {
        self.image_queries.lock().clone()
    }

    fn unavailable_error() -> ProbeError {
        ProbeError::Unavailable {
            message: "scripted outage".to_string(),
        }
    }
}

#[async_trait]
impl ContainerProbe for FakeProbe {
    async fn running_container(
        &self,
        service: &str,
    ) -> Result<Option<ContainerStatus>, ProbeError> {
        let poll = {
            let mut polls = self.polls.lock();
            let count = polls.entry(service.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if self.unavailable {
            return Err(Self::unavailable_error());
        }

        let health = match self.scripts.get(service) {
            None => return Ok(None),
            Some(Script::NoHealthcheck) => None,
            Some(Script::Unhealthy) => Some(HealthState::Unhealthy),
            Some(Script::HealthyOnPoll(n)) if poll >= *n => Some(HealthState::Healthy),
            Some(Script::HealthyOnPoll(_)) => Some(HealthState::Starting),
        };
        Ok(Some(ContainerStatus {
            name: format!("{service}-1"),
            health,
        }))
    }

    async fn image_exists(&self, image: &ImageRef) -> Result<bool, ProbeError> {
        let image = image.to_string();
        self.image_queries.lock().push(image.clone());
        if self.unavailable {
            return Err(Self::unavailable_error());
        }
        Ok(self.images.contains(&image))
    }
}
