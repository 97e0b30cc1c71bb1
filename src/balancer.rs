//! Load balancer assembly.
//!
//! # Responsibilities
//! - Validate configuration and open the endpoint registry
//! - Wire the call router with the configured policy
//! - Run the health monitor when health checking is enabled
//! - Shut down in order: monitor first, then connections

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::{validate_config, BalancerConfig, ConfigError};
use crate::error::{BalancerError, BalancerResult};
use crate::health::{HealthEvent, HealthMonitor};
use crate::lifecycle::BackgroundTask;
use crate::load_balancer::{EndpointStatus, Registry};
use crate::routing::Router;
use crate::transport::Transport;

/// Client-side load balancer over a static endpoint set.
pub struct Balancer<T: Transport> {
    registry: Arc<Registry<T>>,
    router: Router<T>,
    monitor: Option<BackgroundTask>,
}

impl<T: Transport> Balancer<T> {
    /// Open every endpoint and, if enabled, start health checking.
    pub async fn start(config: &BalancerConfig, transport: T) -> BalancerResult<Self> {
        validate_config(config).map_err(|e| BalancerError::Config(ConfigError::Validation(e)))?;

        let registry = Arc::new(Registry::open(Arc::new(transport), &config.balancer.addresses).await?);
        let router = Router::from_config(registry.clone(), config);

        let monitor = if config.health_check.enabled {
            let monitor = HealthMonitor::new(registry.clone(), &config.health_check);
            Some(BackgroundTask::spawn("health-monitor", |shutdown| monitor.run(shutdown)))
        } else {
            tracing::info!("Active health checks disabled");
            None
        };

        tracing::info!(
            endpoints = registry.len(),
            policy = %router.policy(),
            health_aware = router.is_health_aware(),
            max_attempts = router.max_attempts(),
            "Balancer started"
        );

        Ok(Self {
            registry,
            router,
            monitor,
        })
    }

    /// Deliver `request` to a backend, failing over between endpoints.
    pub async fn invoke(&self, request: &T::Request) -> BalancerResult<T::Response> {
        self.router.invoke(request).await
    }

    pub fn registry(&self) -> &Arc<Registry<T>> {
        &self.registry
    }

    pub fn router(&self) -> &Router<T> {
        &self.router
    }

    pub fn has_health_monitor(&self) -> bool {
        self.monitor.is_some()
    }

    /// Status of every endpoint.
    pub fn snapshot(&self) -> Vec<EndpointStatus> {
        self.registry.snapshot()
    }

    /// Subscribe to health transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.registry.subscribe()
    }

    /// Stop the health monitor, then release every connection.
    pub async fn close(mut self) -> BalancerResult<()> {
        if let Some(monitor) = self.monitor.take() {
            monitor.stop().await;
        }
        self.registry.close().await
    }
}

impl<T: Transport> std::fmt::Debug for Balancer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Balancer")
            .field("registry", &self.registry)
            .field("router", &self.router)
            .field("health_monitor", &self.monitor.is_some())
            .finish()
    }
}
