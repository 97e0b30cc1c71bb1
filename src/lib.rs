//! Client-side load balancer for remote calls.
//!
//! Spreads calls over a static set of endpoints, probes their health in the
//! background, and fails over to another endpoint when a call hits a
//! transport failure.

pub mod balancer;
pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod transport;

pub use balancer::Balancer;
pub use config::schema::BalancerConfig;
pub use error::{BalancerError, BalancerResult};
pub use transport::{HttpTransport, RpcRequest, Transport, TransportError};
