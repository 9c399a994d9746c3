// ABOUTME: Bounded polling until deployed services report healthy.
// ABOUTME: Fixed delay between attempts; no cancellation beyond the retry budget.

use std::time::Duration;

use crate::runtime::ContainerProbe;

/// How many times to poll and how long to wait between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Upper bound on time spent sleeping for one service.
    pub fn worst_case(&self) -> Duration {
        self.delay * self.max_retries.saturating_sub(1)
    }
}

/// Outcome of waiting on a set of services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    pub healthy: Vec<String>,
    pub timed_out: Vec<String>,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.timed_out.is_empty()
    }
}

pub struct HealthWaiter<'a> {
    probe: &'a dyn ContainerProbe,
    policy: RetryPolicy,
}

impl<'a> HealthWaiter<'a> {
    pub fn new(probe: &'a dyn ContainerProbe, policy: RetryPolicy) -> Self {
        Self { probe, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Poll until `service` is running and healthy, or the retry budget runs out.
    ///
    /// A running container without a declared health check counts as healthy.
    /// Returns on the first healthy poll; after `max_retries` failed polls
    /// returns false, having slept `delay` between consecutive polls.
    pub async fn wait_for_service(&self, service: &str) -> bool {
        let max = self.policy.max_retries;

        for attempt in 1..=max {
            match self.probe.running_container(service).await {
                Ok(Some(status)) if status.is_ready() => {
                    match status.health {
                        Some(_) => tracing::info!(%service, "running and healthy"),
                        None => tracing::info!(%service, "running, no health check defined"),
                    }
                    return true;
                }
                Ok(Some(status)) => {
                    let health = status
                        .health
                        .map(|h| h.to_string())
                        .unwrap_or_default();
                    tracing::warn!(%service, %health, "running but not healthy");
                }
                Ok(None) => tracing::warn!(%service, "not running"),
                Err(e) => tracing::warn!(%service, "runtime query failed: {}", e),
            }

            if attempt < max {
                tracing::warn!(
                    %service,
                    "retry {}/{}, waiting {:?}",
                    attempt,
                    max,
                    self.policy.delay
                );
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        tracing::error!(%service, "did not become healthy after {} attempts", max);
        false
    }

    /// Wait for every service in order. Every service is awaited even after an
    /// earlier one has timed out.
    pub async fn wait_for_all_services<S: AsRef<str>>(&self, services: &[S]) -> HealthReport {
        let mut report = HealthReport::default();
        for service in services {
            let service = service.as_ref();
            if self.wait_for_service(service).await {
                report.healthy.push(service.to_string());
            } else {
                report.timed_out.push(service.to_string());
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_case_counts_sleeps_between_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        assert_eq!(policy.worst_case(), Duration::from_secs(20));
        assert_eq!(
            RetryPolicy::new(0, Duration::from_secs(10)).worst_case(),
            Duration::ZERO
        );
    }

    #[test]
    fn report_with_timeouts_is_not_healthy() {
        let report = HealthReport {
            healthy: vec!["auth".to_string()],
            timed_out: vec!["billing".to_string()],
        };
        assert!(!report.all_healthy());
        assert!(HealthReport::default().all_healthy());
    }
}
