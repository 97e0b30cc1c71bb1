//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every endpoint
//! - Update endpoint health state based on results

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::state::{HealthState, TransitionCause};
use crate::load_balancer::registry::Registry;
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;
use crate::transport::{Transport, TransportError};

/// Outcome of probing one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Passed,
    Failed(TransportError),
}

pub struct HealthMonitor<T: Transport> {
    registry: Arc<Registry<T>>,
    interval: Duration,
    timeout: Duration,
}

impl<T: Transport> HealthMonitor<T> {
    pub fn new(registry: Arc<Registry<T>>, config: &HealthCheckConfig) -> Self {
        Self {
            registry,
            interval: Duration::from_secs(config.interval_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Override the probe period and timeout (sub-second values in tests).
    pub fn with_timing(mut self, interval: Duration, timeout: Duration) -> Self {
        self.interval = interval;
        self.timeout = timeout;
        self
    }

    /// Run the loop on its own task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Probe every `interval` until shutdown is signalled.
    ///
    /// The first cycle runs one interval after start. Shutdown is observed
    /// between cycles; a cycle in flight finishes within the probe timeout.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            timeout = ?self.timeout,
            endpoints = self.registry.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // A pending shutdown wins over an overdue tick.
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    if self.registry.is_closed() {
                        tracing::info!("Registry closed, health monitor exiting");
                        break;
                    }
                    self.check_all().await;
                }
            }
        }
    }

    /// Run one probe cycle over every endpoint, concurrently.
    pub async fn check_all(&self) -> Vec<(usize, ProbeOutcome)> {
        let ids = match self.registry.all_ids() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping health check cycle");
                return Vec::new();
            }
        };

        let probes = ids.into_iter().map(|id| async move {
            let outcome = self.probe(id).await;
            self.apply(id, &outcome);
            (id, outcome)
        });

        join_all(probes).await
    }

    async fn probe(&self, id: usize) -> ProbeOutcome {
        let connection = match self.registry.connection_for(id) {
            Ok(connection) => connection,
            Err(e) => return ProbeOutcome::Failed(TransportError::Unavailable(e.to_string())),
        };

        let transport = self.registry.transport();
        match with_timeout(self.timeout, transport.probe(&connection)).await {
            Ok(()) => ProbeOutcome::Passed,
            Err(e) => ProbeOutcome::Failed(e),
        }
    }

    fn apply(&self, id: usize, outcome: &ProbeOutcome) {
        let address = self
            .registry
            .endpoint(id)
            .map(|e| e.address.clone())
            .unwrap_or_default();

        let result = match outcome {
            ProbeOutcome::Passed => {
                metrics::record_probe(&address, true);
                self.registry.set_health(id, HealthState::Healthy, TransitionCause::ProbeSuccess)
            }
            ProbeOutcome::Failed(e) => {
                tracing::warn!(endpoint = id, address = %address, error = %e, "Health probe failed");
                metrics::record_probe(&address, false);
                self.registry.set_health(id, HealthState::Unhealthy, TransitionCause::ProbeFailure)
            }
        };

        // Only fails if the registry closed mid-cycle.
        if let Err(e) = result.and_then(|_| self.registry.record_check(id)) {
            tracing::debug!(endpoint = id, error = %e, "Probe outcome discarded");
        }
    }
}
