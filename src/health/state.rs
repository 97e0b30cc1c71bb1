//! Endpoint health state and transition events.
//!
//! # States
//! - Healthy: endpoint receives traffic
//! - Unhealthy: endpoint excluded from health-aware selection
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: failed call (router) or failed probe (monitor)
//! Unhealthy → Healthy: successful probe (monitor only)
//! ```
//!
//! # Design Decisions
//! - Endpoints start Healthy until the first probe says otherwise
//! - A single outcome flips the state; there is no hysteresis
//! - Transitions are published for observers, never required

use serde::Serialize;

/// Health state of one endpoint.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            2 => HealthState::Unhealthy,
            _ => HealthState::Healthy,
        }
    }
}

/// What caused a health transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// An application call failed at the transport level.
    CallFailure,
    /// A health probe failed or timed out.
    ProbeFailure,
    /// A health probe succeeded.
    ProbeSuccess,
}

/// Published whenever an endpoint changes health state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthEvent {
    pub endpoint_id: usize,
    pub address: String,
    pub from: HealthState,
    pub to: HealthState,
    pub cause: TransitionCause,
}
