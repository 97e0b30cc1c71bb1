//! Retry bookkeeping for a single call.
//!
//! # Responsibilities
//! - Bound the number of attempts per call
//! - Remember which endpoints were already tried
//! - Keep the last transport error for the final report
//!
//! # Design Decisions
//! - A call never visits the same endpoint twice
//! - No backoff between attempts: the next attempt goes to a different endpoint

use crate::error::BalancerError;
use crate::transport::TransportError;

/// Attempt state of one call.
#[derive(Debug)]
pub struct AttemptBudget {
    max_attempts: usize,
    tried: Vec<usize>,
    last_error: Option<TransportError>,
}

impl AttemptBudget {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            tried: Vec::with_capacity(max_attempts),
            last_error: None,
        }
    }

    /// Attempts made so far.
    pub fn attempts(&self) -> usize {
        self.tried.len()
    }

    /// True once the attempt bound is reached.
    pub fn is_spent(&self) -> bool {
        self.tried.len() >= self.max_attempts
    }

    /// Record that endpoint `id` is about to be tried.
    pub fn begin(&mut self, id: usize) {
        self.tried.push(id);
    }

    /// Record the failure of the latest attempt.
    pub fn fail(&mut self, error: TransportError) {
        self.last_error = Some(error);
    }

    /// Drop already-tried ids from `candidates`.
    pub fn exclude_tried(&self, candidates: &mut Vec<usize>) {
        candidates.retain(|id| !self.tried.contains(id));
    }

    /// The error to surface when no further attempt is possible.
    pub fn into_error(self) -> BalancerError {
        match self.last_error {
            Some(last) => BalancerError::AllEndpointsExhausted {
                attempts: self.tried.len(),
                last,
            },
            None => BalancerError::NoHealthyEndpoints,
        }
    }
}
