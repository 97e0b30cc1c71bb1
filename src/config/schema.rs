//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BalancerConfig {
    /// Endpoint set and call routing.
    pub balancer: RoutingConfig,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Settings for the HTTP transport.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl BalancerConfig {
    /// Configuration for the given endpoints with every other field defaulted.
    pub fn with_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        config.balancer.addresses = addresses.into_iter().map(Into::into).collect();
        config
    }

    /// The policy in effect: explicit setting, or derived from health checking.
    pub fn effective_policy(&self) -> SelectionPolicy {
        self.balancer.selection_policy.unwrap_or(if self.health_check.enabled {
            SelectionPolicy::HealthyRandom
        } else {
            SelectionPolicy::RoundRobin
        })
    }

    /// The retry bound in effect: explicit setting, or the endpoint count.
    pub fn effective_max_attempts(&self) -> usize {
        self.balancer
            .max_retry_attempts
            .map(|n| n as usize)
            .unwrap_or(self.balancer.addresses.len())
    }
}

/// Endpoint selection policy.
///
/// Config files and the command line both use the kebab-case names.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Rotate through endpoints in registration order.
    RoundRobin,
    /// Pick uniformly at random among all endpoints.
    UniformRandom,
    /// Pick uniformly at random among healthy endpoints.
    HealthyRandom,
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{:?}", self),
        }
    }
}

/// Endpoint set and call routing.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Ordered endpoint addresses (e.g., "127.0.0.1:50051"). Ids follow this order.
    pub addresses: Vec<String>,

    /// Selection policy. Unset means healthy-random with health checks, round-robin without.
    pub selection_policy: Option<SelectionPolicy>,

    /// Maximum attempts per call. Unset means one per endpoint.
    pub max_retry_attempts: Option<u32>,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Health check timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            timeout_secs: 5,
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Application call timeout in seconds.
    pub request_timeout_secs: u64,

    /// Path to probe for health checks.
    pub probe_path: String,

    /// Idle keep-alive connections kept per endpoint.
    pub max_idle_per_endpoint: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            probe_path: "/health".to_string(),
            max_idle_per_endpoint: 32,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
