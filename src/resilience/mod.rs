//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to endpoint:
//!     → retries.rs (attempt bound, endpoints already tried)
//!     → on transport failure: demote endpoint, try a different one
//!
//! Probe to endpoint:
//!     → timeouts.rs (hard deadline per probe)
//! ```
//!
//! # Design Decisions
//! - Every probe has a deadline; application call deadlines belong to the transport
//! - Retries are bounded by attempt count, never by recursion depth

pub mod retries;
pub mod timeouts;
