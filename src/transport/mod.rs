//! Transport abstraction for calls to backend endpoints.
//!
//! # Responsibilities
//! - Open one long-lived connection handle per endpoint
//! - Deliver application calls over that handle
//! - Answer lightweight health probes
//! - Release the handle on shutdown
//!
//! # Design Decisions
//! - The balancer never knows the wire format; it only sees `Transport`
//! - Errors say whether the endpoint failed (retry elsewhere) or the call
//!   was rejected by a working endpoint (surface to the caller)

pub mod http;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use http::{HttpConnection, HttpTransport, RpcRequest};

/// Errors returned by a single transport operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connect to {address} failed: {reason}")]
    Connect { address: String, reason: String },

    /// The endpoint could not serve the call (network error, 5xx).
    #[error("endpoint unavailable: {0}")]
    Unavailable(String),

    /// The operation did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint is up but refused this particular call.
    #[error("call rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl TransportError {
    /// True when the failure is attributable to the endpoint, not the request.
    pub fn is_transport_failure(&self) -> bool {
        !matches!(self, TransportError::Rejected { .. })
    }
}

/// A way of reaching backend endpoints.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Long-lived handle to one endpoint.
    type Connection: Send + Sync + 'static;
    /// Application request.
    type Request: Send + Sync;
    /// Application response.
    type Response: Send;

    /// Establish the handle for `address`.
    async fn connect(&self, address: &str) -> Result<Self::Connection, TransportError>;

    /// Deliver one application call.
    async fn invoke(
        &self,
        connection: &Self::Connection,
        request: &Self::Request,
    ) -> Result<Self::Response, TransportError>;

    /// Lightweight health probe. The caller bounds it with a timeout.
    async fn probe(&self, connection: &Self::Connection) -> Result<(), TransportError>;

    /// Release the handle.
    async fn close(&self, _connection: &Self::Connection) {}
}
