//! Endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single backend endpoint
//! - Own the endpoint's long-lived connection handle
//! - Track health state (Healthy/Unhealthy) and last probe time

use arc_swap::ArcSwapOption;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::health::state::HealthState;

/// A single backend endpoint.
#[derive(Debug)]
pub struct Endpoint<C> {
    /// Stable position in the registry.
    pub id: usize,
    /// Connection target.
    pub address: String,
    /// Emptied when the endpoint is released.
    connection: ArcSwapOption<C>,
    /// Current health state (1=Healthy, 2=Unhealthy).
    state: AtomicU8,
    /// Unix millis of the last probe outcome, 0 if never probed.
    last_checked_ms: AtomicU64,
}

impl<C> Endpoint<C> {
    /// Create a new endpoint around an open connection. Starts healthy.
    pub fn new(id: usize, address: String, connection: C) -> Self {
        Self {
            id,
            address,
            connection: ArcSwapOption::from_pointee(connection),
            state: AtomicU8::new(HealthState::Healthy as u8),
            last_checked_ms: AtomicU64::new(0),
        }
    }

    /// Shared handle to the connection, `None` once released.
    pub fn connection(&self) -> Option<Arc<C>> {
        self.connection.load_full()
    }

    /// Give up this endpoint's handle. Returns it the first time only.
    pub fn release(&self) -> Option<Arc<C>> {
        self.connection.swap(None)
    }

    pub fn health(&self) -> HealthState {
        HealthState::from(self.state.load(Ordering::Acquire))
    }

    pub fn is_healthy(&self) -> bool {
        self.health() == HealthState::Healthy
    }

    /// Move to `target`. Returns the previous state if this call changed it.
    pub fn transition(&self, target: HealthState) -> Option<HealthState> {
        let previous = HealthState::from(self.state.swap(target as u8, Ordering::AcqRel));
        (previous != target).then_some(previous)
    }

    /// Stamp the time of a probe outcome.
    pub fn record_check(&self) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.last_checked_ms.store(now.max(1), Ordering::Release);
    }

    /// Unix millis of the last probe outcome.
    pub fn last_checked_ms(&self) -> Option<u64> {
        match self.last_checked_ms.load(Ordering::Acquire) {
            0 => None,
            ms => Some(ms),
        }
    }

    pub fn status(&self) -> EndpointStatus {
        EndpointStatus {
            id: self.id,
            address: self.address.clone(),
            health: self.health(),
            last_checked_ms: self.last_checked_ms(),
        }
    }
}

/// Point-in-time view of an endpoint, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointStatus {
    pub id: usize,
    pub address: String,
    pub health: HealthState,
    pub last_checked_ms: Option<u64>,
}
