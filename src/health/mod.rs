//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each endpoint (bounded by timeout)
//!     → Update state.rs
//!
//! Call failures (routing::router):
//!     Transport failure observed
//!     → Demote endpoint immediately
//!
//! State machine (state.rs):
//!     Healthy ←→ Unhealthy
//! ```
//!
//! # Design Decisions
//! - Only probes promote; calls can only demote
//! - One endpoint's probe never delays or aborts another's
//! - Health state is per-endpoint, flipped atomically

pub mod active;
pub mod state;

pub use active::{HealthMonitor, ProbeOutcome};
pub use state::{HealthEvent, HealthState, TransitionCause};
