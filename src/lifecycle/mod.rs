//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (crate::balancer):
//!     Validate config → Open registry → Start health monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal monitor → Wait for its cycle → Close registry
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then connections, then background tasks
//! - Ordered shutdown: background tasks stop before connections close

pub mod shutdown;
pub mod signals;

pub use shutdown::{BackgroundTask, Shutdown};
