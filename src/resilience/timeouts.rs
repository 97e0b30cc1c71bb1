//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap transport operations with a deadline
//! - Map an elapsed deadline to a distinct transport error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - The wrapped future is dropped on timeout, so nothing waits past the bound

use std::future::Future;
use std::time::Duration;

use crate::transport::TransportError;

/// Run `fut` for at most `limit`.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(limit)),
    }
}
