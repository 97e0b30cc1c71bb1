//! Errors surfaced by the balancer.

use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Errors that can occur while building or using a balancer.
#[derive(Debug, Error)]
pub enum BalancerError {
    /// The registry was given no addresses.
    #[error("endpoint address list is empty")]
    EmptyAddressList,

    /// An endpoint connection could not be opened at startup.
    #[error("failed to open endpoint {address}: {source}")]
    RegistryInit {
        address: String,
        #[source]
        source: TransportError,
    },

    /// No endpoint is currently eligible for selection.
    #[error("no healthy endpoints available")]
    NoHealthyEndpoints,

    /// Every attempt allowed for the call failed.
    #[error("all endpoints exhausted after {attempts} attempts, last error: {last}")]
    AllEndpointsExhausted { attempts: usize, last: TransportError },

    /// A working endpoint refused the call.
    #[error("call rejected: {0}")]
    Rejected(TransportError),

    /// The registry has been closed.
    #[error("endpoint registry is closed")]
    RegistryClosed,

    /// No endpoint has this id.
    #[error("unknown endpoint id {0}")]
    UnknownEndpoint(usize),

    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for balancer operations.
pub type BalancerResult<T> = Result<T, BalancerError>;
