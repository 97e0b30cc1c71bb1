//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, registry, health monitor produce:
//!     → logging.rs (structured log events, call_id spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
