//! Readiness polling for the controller's custom resource
//!
//! A fixed-interval probe loop with a hard deadline. No backoff.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::framework::{FrameworkError, Result};
use crate::k8s::{CustomResourceSpec, Platform};
use crate::utils::{Clock, Timer};

/// Interval between readiness probes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Overall readiness deadline
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(90);

/// Result of a bounded poll
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The condition held on probe number `probes`
    Ready { probes: u32 },

    /// The deadline passed first
    TimedOut { probes: u32, elapsed: Duration },
}

/// Bounded fixed-interval poller
pub struct ReadinessPoller<'a, C: Clock + ?Sized> {
    clock: &'a C,
    interval: Duration,
    timeout: Duration,
}

impl<'a, C: Clock + ?Sized> ReadinessPoller<'a, C> {
    pub fn new(clock: &'a C) -> Self {
        Self {
            clock,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.interval
    }

    pub fn deadline(&self) -> Duration {
        self.timeout
    }

    /// Run `probe` until it reports `true` or the next probe would land past
    /// the deadline
    ///
    /// The first probe fires immediately. A probe error ends polling at once.
    pub async fn poll<F, Fut>(&self, mut probe: F) -> Result<PollOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let timer = Timer::start(self.clock, "poll");
        let mut probes = 0u32;

        loop {
            probes += 1;
            if probe().await? {
                return Ok(PollOutcome::Ready { probes });
            }
            let elapsed = timer.elapsed(self.clock);
            if elapsed + self.interval > self.timeout {
                return Ok(PollOutcome::TimedOut { probes, elapsed });
            }

            debug!("Probe {} not ready, retrying in {}s", probes, self.interval.as_secs());
            self.clock.sleep(self.interval).await;
        }
    }

    /// Block until the custom resource type answers in `namespace`
    pub async fn wait_until_ready<P: Platform + ?Sized>(
        &self,
        platform: &P,
        host: &str,
        namespace: &str,
        resource: &CustomResourceSpec,
    ) -> Result<()> {
        info!(
            "Waiting for {} at {} (timeout: {}s)",
            resource.plural,
            resource.endpoint(host, namespace),
            self.timeout.as_secs()
        );

        let outcome = self
            .poll(move || platform.probe_readiness(host, namespace, resource))
            .await?;

        match outcome {
            PollOutcome::Ready { probes } => {
                info!("{} ready after {} probes", resource.plural, probes);
                Ok(())
            }
            PollOutcome::TimedOut { probes, .. } => {
                warn!("{} not ready after {} probes", resource.plural, probes);
                Err(FrameworkError::ReadinessTimeout {
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Block until `namespace` no longer exists
    pub async fn wait_until_deleted<P: Platform + ?Sized>(
        &self,
        platform: &P,
        namespace: &str,
    ) -> Result<()> {
        let outcome = self
            .poll(move || async move {
                platform
                    .namespace_exists(namespace)
                    .await
                    .map(|exists| !exists)
            })
            .await?;

        match outcome {
            PollOutcome::Ready { .. } => {
                info!("Namespace {} deleted", namespace);
                Ok(())
            }
            PollOutcome::TimedOut { .. } => Err(FrameworkError::DeletionTimeout {
                namespace: namespace.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}
