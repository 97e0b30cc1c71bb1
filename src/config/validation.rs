//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Reject empty or duplicated endpoint lists
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::BalancerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("balancer.addresses must not be empty")]
    NoAddresses,

    #[error("duplicate endpoint address '{0}'")]
    DuplicateAddress(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("health_check.timeout_secs ({timeout}) must not exceed interval_secs ({interval})")]
    TimeoutExceedsInterval { timeout: u64, interval: u64 },
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.balancer.addresses.is_empty() {
        errors.push(ValidationError::NoAddresses);
    }

    let mut seen = HashSet::new();
    for address in &config.balancer.addresses {
        if !seen.insert(address.as_str()) {
            errors.push(ValidationError::DuplicateAddress(address.clone()));
        }
    }

    if config.balancer.max_retry_attempts == Some(0) {
        errors.push(ValidationError::Zero { field: "balancer.max_retry_attempts" });
    }

    let health = &config.health_check;
    if health.enabled {
        if health.interval_secs == 0 {
            errors.push(ValidationError::Zero { field: "health_check.interval_secs" });
        }
        if health.timeout_secs == 0 {
            errors.push(ValidationError::Zero { field: "health_check.timeout_secs" });
        }
        if health.interval_secs > 0 && health.timeout_secs > health.interval_secs {
            errors.push(ValidationError::TimeoutExceedsInterval {
                timeout: health.timeout_secs,
                interval: health.interval_secs,
            });
        }
    }

    if config.transport.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "transport.request_timeout_secs" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
