//! Call routing subsystem.
//!
//! # Data Flow
//! ```text
//! Caller request
//!     → router.rs (candidate pool from registry health snapshot)
//!     → load_balancer selector picks an endpoint
//!     → transport delivers the call
//!     → on transport failure: demote, exclude, try the next candidate
//!     → response, or the final error once attempts run out
//! ```
//!
//! # Design Decisions
//! - Bounded loop, never recursion
//! - Demotion is synchronous on the call path for fastest failover
//! - Application-level rejections are returned as-is, without demotion

pub mod router;

pub use router::Router;
