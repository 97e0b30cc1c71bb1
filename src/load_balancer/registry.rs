//! Endpoint registry.
//!
//! # Responsibilities
//! - Open one connection per endpoint, in address order
//! - Hand out shared connection handles without opening or closing any
//! - Flip endpoint health and publish transitions
//! - Release every connection on close

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::{BalancerError, BalancerResult};
use crate::health::state::{HealthEvent, HealthState, TransitionCause};
use crate::load_balancer::endpoint::{Endpoint, EndpointStatus};
use crate::observability::metrics;
use crate::transport::Transport;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Owns the ordered endpoint set and their connections.
pub struct Registry<T: Transport> {
    transport: Arc<T>,
    endpoints: Vec<Endpoint<T::Connection>>,
    closed: AtomicBool,
    events: broadcast::Sender<HealthEvent>,
}

impl<T: Transport> Registry<T> {
    /// Open a connection to every address. Ids follow address order.
    ///
    /// On failure, connections opened so far are released before returning.
    pub async fn open(transport: Arc<T>, addresses: &[String]) -> BalancerResult<Self> {
        if addresses.is_empty() {
            return Err(BalancerError::EmptyAddressList);
        }

        let mut endpoints: Vec<Endpoint<T::Connection>> = Vec::with_capacity(addresses.len());
        for (id, address) in addresses.iter().enumerate() {
            match transport.connect(address).await {
                Ok(connection) => {
                    tracing::debug!(endpoint = id, address = %address, "Endpoint connection opened");
                    endpoints.push(Endpoint::new(id, address.clone(), connection));
                    metrics::record_endpoint_health(address, true);
                }
                Err(source) => {
                    tracing::error!(endpoint = id, address = %address, error = %source, "Failed to open endpoint");
                    for endpoint in &endpoints {
                        if let Some(connection) = endpoint.release() {
                            transport.close(&connection).await;
                        }
                    }
                    return Err(BalancerError::RegistryInit {
                        address: address.clone(),
                        source,
                    });
                }
            }
        }

        tracing::info!(endpoints = endpoints.len(), "Endpoint registry opened");

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            transport,
            endpoints,
            closed: AtomicBool::new(false),
            events,
        })
    }

    fn ensure_open(&self) -> BalancerResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(BalancerError::RegistryClosed)
        } else {
            Ok(())
        }
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; an empty registry cannot be opened.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn endpoint(&self, id: usize) -> BalancerResult<&Endpoint<T::Connection>> {
        self.ensure_open()?;
        self.endpoints.get(id).ok_or(BalancerError::UnknownEndpoint(id))
    }

    /// The connection owned by endpoint `id`.
    pub fn connection_for(&self, id: usize) -> BalancerResult<Arc<T::Connection>> {
        self.endpoint(id)?.connection().ok_or(BalancerError::RegistryClosed)
    }

    /// Every endpoint id, in registration order.
    pub fn all_ids(&self) -> BalancerResult<Vec<usize>> {
        self.ensure_open()?;
        Ok((0..self.endpoints.len()).collect())
    }

    /// Snapshot of healthy ids, ascending. May be stale as soon as it returns.
    pub fn healthy_ids(&self) -> BalancerResult<Vec<usize>> {
        self.ensure_open()?;
        Ok(self
            .endpoints
            .iter()
            .filter(|e| e.is_healthy())
            .map(|e| e.id)
            .collect())
    }

    /// Demote after a failed call. Returns true if the endpoint was healthy.
    pub fn mark_unhealthy(&self, id: usize) -> BalancerResult<bool> {
        self.set_health(id, HealthState::Unhealthy, TransitionCause::CallFailure)
    }

    /// Promote after a successful probe. Returns true if the endpoint was unhealthy.
    pub fn mark_healthy(&self, id: usize) -> BalancerResult<bool> {
        self.set_health(id, HealthState::Healthy, TransitionCause::ProbeSuccess)
    }

    /// Move endpoint `id` to `target`, publishing an event if it changed.
    pub fn set_health(
        &self,
        id: usize,
        target: HealthState,
        cause: TransitionCause,
    ) -> BalancerResult<bool> {
        let endpoint = self.endpoint(id)?;
        let Some(from) = endpoint.transition(target) else {
            return Ok(false);
        };

        match target {
            HealthState::Unhealthy => tracing::warn!(
                endpoint = id, address = %endpoint.address, cause = ?cause,
                "Endpoint marked unhealthy"
            ),
            HealthState::Healthy => tracing::info!(
                endpoint = id, address = %endpoint.address, cause = ?cause,
                "Endpoint marked healthy"
            ),
        }
        metrics::record_endpoint_health(&endpoint.address, target == HealthState::Healthy);

        // No subscribers is fine.
        let _ = self.events.send(HealthEvent {
            endpoint_id: id,
            address: endpoint.address.clone(),
            from,
            to: target,
            cause,
        });
        Ok(true)
    }

    /// Stamp the last probe time of endpoint `id`.
    pub fn record_check(&self, id: usize) -> BalancerResult<()> {
        self.endpoint(id).map(Endpoint::record_check)
    }

    /// Status of every endpoint.
    pub fn snapshot(&self) -> Vec<EndpointStatus> {
        self.endpoints.iter().map(Endpoint::status).collect()
    }

    /// Subscribe to health transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.events.subscribe()
    }

    /// Release every connection. Later operations fail with `RegistryClosed`.
    ///
    /// The registry drops its own handles; a call still in flight keeps its
    /// clone until it returns.
    pub async fn close(&self) -> BalancerResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(BalancerError::RegistryClosed);
        }
        for endpoint in &self.endpoints {
            if let Some(connection) = endpoint.release() {
                self.transport.close(&connection).await;
            }
        }
        tracing::info!(endpoints = self.endpoints.len(), "Endpoint registry closed");
        Ok(())
    }
}

impl<T: Transport> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("endpoints", &self.snapshot())
            .field("closed", &self.is_closed())
            .finish()
    }
}
