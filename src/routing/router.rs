//! Call router.
//!
//! # Responsibilities
//! - Pick a candidate endpoint per attempt using the configured policy
//! - Delegate the call to the transport
//! - Demote an endpoint as soon as a call to it fails
//! - Retry on distinct endpoints, up to the attempt bound

use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{BalancerConfig, SelectionPolicy};
use crate::error::{BalancerError, BalancerResult};
use crate::load_balancer::{registry::Registry, selector_for, Selector};
use crate::observability::metrics;
use crate::resilience::retries::AttemptBudget;
use crate::transport::Transport;

/// Routes calls across the endpoints of a registry.
pub struct Router<T: Transport> {
    registry: Arc<Registry<T>>,
    policy: SelectionPolicy,
    selector: Box<dyn Selector>,
    /// Restrict candidates to healthy endpoints.
    health_aware: bool,
    max_attempts: usize,
}

impl<T: Transport> Router<T> {
    pub fn new(
        registry: Arc<Registry<T>>,
        policy: SelectionPolicy,
        health_aware: bool,
        max_attempts: usize,
    ) -> Self {
        Self {
            registry,
            policy,
            selector: selector_for(policy),
            // healthy-random filters by definition
            health_aware: health_aware || policy == SelectionPolicy::HealthyRandom,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Router with the policy, health awareness and retry bound of `config`.
    pub fn from_config(registry: Arc<Registry<T>>, config: &BalancerConfig) -> Self {
        Self::new(
            registry,
            config.effective_policy(),
            config.health_check.enabled,
            config.effective_max_attempts(),
        )
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn is_health_aware(&self) -> bool {
        self.health_aware
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Deliver `request` to one endpoint, failing over on transport errors.
    pub async fn invoke(&self, request: &T::Request) -> BalancerResult<T::Response> {
        let call_id = Uuid::new_v4();
        self.route(request)
            .instrument(tracing::info_span!("invoke", %call_id, policy = %self.policy))
            .await
    }

    async fn route(&self, request: &T::Request) -> BalancerResult<T::Response> {
        let mut budget = AttemptBudget::new(self.max_attempts);

        loop {
            // 1. Candidate pool, minus endpoints this call already tried
            let mut candidates = if self.health_aware {
                self.registry.healthy_ids()?
            } else {
                self.registry.all_ids()?
            };
            budget.exclude_tried(&mut candidates);

            // 2. Select
            let Some(id) = self.selector.select(&candidates) else {
                let err = budget.into_error();
                tracing::warn!(error = %err, "No candidate endpoint left");
                return Err(err);
            };
            if budget.attempts() > 0 {
                metrics::record_retry();
            }
            budget.begin(id);

            // 3. Delegate
            let endpoint = self.registry.endpoint(id)?;
            let connection = self.registry.connection_for(id)?;
            let start = Instant::now();
            let result = self.registry.transport().invoke(&connection, request).await;

            match result {
                Ok(response) => {
                    metrics::record_call(&endpoint.address, "success", start);
                    tracing::debug!(endpoint = id, address = %endpoint.address, attempt = budget.attempts(), "Call succeeded");
                    return Ok(response);
                }
                Err(e) if !e.is_transport_failure() => {
                    metrics::record_call(&endpoint.address, "rejected", start);
                    tracing::debug!(endpoint = id, address = %endpoint.address, error = %e, "Call rejected by endpoint");
                    return Err(BalancerError::Rejected(e));
                }
                Err(e) => {
                    metrics::record_call(&endpoint.address, "failure", start);
                    tracing::warn!(
                        endpoint = id,
                        address = %endpoint.address,
                        attempt = budget.attempts(),
                        error = %e,
                        "Call failed, demoting endpoint"
                    );

                    // 4. Demote now; the health monitor is the only way back
                    self.registry.mark_unhealthy(id)?;
                    budget.fail(e);

                    if budget.is_spent() {
                        let err = budget.into_error();
                        tracing::error!(error = %err, "Retry bound reached");
                        return Err(err);
                    }
                }
            }
        }
    }
}

impl<T: Transport> std::fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("policy", &self.policy)
            .field("health_aware", &self.health_aware)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
