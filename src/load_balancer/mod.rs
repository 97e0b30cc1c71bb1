//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Router asks for a candidate
//!     → registry.rs (healthy or full id snapshot)
//!     → Apply selection policy:
//!         - round_robin.rs (rotate through endpoints)
//!         - random.rs (uniform, or uniform over healthy)
//!     → endpoint.rs (connection handle for the chosen id)
//! ```
//!
//! # Design Decisions
//! - Selectors see plain id slices; the registry owns all endpoint state
//! - Only the round-robin cursor is selector state, and it is atomic
//! - Unhealthy endpoints are filtered before selection, not inside it

pub mod endpoint;
pub mod random;
pub mod registry;
pub mod round_robin;

use crate::config::SelectionPolicy;

pub use endpoint::{Endpoint, EndpointStatus};
pub use random::{HealthyRandom, UniformRandom};
pub use registry::Registry;
pub use round_robin::RoundRobin;

/// A selection strategy over candidate endpoint ids.
pub trait Selector: Send + Sync + std::fmt::Debug {
    /// Pick one of `candidates`, or `None` if there are none.
    fn select(&self, candidates: &[usize]) -> Option<usize>;
}

/// Build the selector for a policy.
pub fn selector_for(policy: SelectionPolicy) -> Box<dyn Selector> {
    match policy {
        SelectionPolicy::RoundRobin => Box::new(RoundRobin::new()),
        SelectionPolicy::UniformRandom => Box::new(UniformRandom::new()),
        SelectionPolicy::HealthyRandom => Box::new(HealthyRandom::new()),
    }
}
