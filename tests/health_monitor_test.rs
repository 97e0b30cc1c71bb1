//! Health monitor probing, promotion and shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rpc_balancer::config::{BalancerConfig, HealthCheckConfig, SelectionPolicy};
use rpc_balancer::health::{HealthMonitor, HealthState, ProbeOutcome, TransitionCause};
use rpc_balancer::lifecycle::Shutdown;
use rpc_balancer::load_balancer::{HealthyRandom, Registry};
use rpc_balancer::{Balancer, TransportError};

mod common;
use common::{addresses, Behavior, ScriptedTransport};

async fn registry(n: usize) -> (ScriptedTransport, Arc<Registry<ScriptedTransport>>) {
    let transport = ScriptedTransport::new();
    let registry = Registry::open(Arc::new(transport.clone()), &addresses(n))
        .await
        .unwrap();
    (transport, Arc::new(registry))
}

fn monitor(
    registry: &Arc<Registry<ScriptedTransport>>,
    interval: Duration,
    timeout: Duration,
) -> HealthMonitor<ScriptedTransport> {
    HealthMonitor::new(registry.clone(), &HealthCheckConfig::default()).with_timing(interval, timeout)
}

#[tokio::test]
async fn test_failed_probe_demotes_only_that_endpoint() {
    let (transport, registry) = registry(3).await;
    transport.set_probe("E1", Behavior::Fail);

    let outcomes = monitor(&registry, Duration::from_secs(30), Duration::from_secs(5))
        .check_all()
        .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(registry.healthy_ids().unwrap(), vec![0, 2]);
    assert!(registry.snapshot().iter().all(|s| s.last_checked_ms.is_some()));

    let selector = HealthyRandom::new();
    for _ in 0..100 {
        assert_ne!(selector.select_from(&registry).unwrap(), Some(1));
    }
}

#[tokio::test]
async fn test_passing_probe_promotes() {
    let (transport, registry) = registry(2).await;
    registry.mark_unhealthy(0).unwrap();
    let mut events = registry.subscribe();

    monitor(&registry, Duration::from_secs(30), Duration::from_secs(5))
        .check_all()
        .await;

    assert_eq!(registry.healthy_ids().unwrap(), vec![0, 1]);
    let event = events.recv().await.unwrap();
    assert_eq!(event.endpoint_id, 0);
    assert_eq!(event.to, HealthState::Healthy);
    assert_eq!(event.cause, TransitionCause::ProbeSuccess);
    assert_eq!(transport.probe_count(), 2);
}

#[tokio::test]
async fn test_probe_failure_event_cause() {
    let (transport, registry) = registry(1).await;
    transport.set_probe("E0", Behavior::Fail);
    let mut events = registry.subscribe();

    monitor(&registry, Duration::from_secs(30), Duration::from_secs(5))
        .check_all()
        .await;

    let event = events.recv().await.unwrap();
    assert_eq!(event.to, HealthState::Unhealthy);
    assert_eq!(event.cause, TransitionCause::ProbeFailure);
}

#[tokio::test]
async fn test_rejected_probe_counts_as_failure() {
    let (transport, registry) = registry(1).await;
    transport.set_probe("E0", Behavior::Reject);

    monitor(&registry, Duration::from_secs(30), Duration::from_secs(5))
        .check_all()
        .await;

    assert!(registry.healthy_ids().unwrap().is_empty());
}

#[tokio::test]
async fn test_hanging_probe_is_bounded_and_isolated() {
    let (transport, registry) = registry(3).await;
    transport.set_probe("E1", Behavior::Hang);
    let timeout = Duration::from_millis(100);

    let started = Instant::now();
    let outcomes = monitor(&registry, Duration::from_secs(30), timeout)
        .check_all()
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    let e1 = outcomes.iter().find(|(id, _)| *id == 1).map(|(_, o)| o.clone());
    assert_eq!(e1, Some(ProbeOutcome::Failed(TransportError::Timeout(timeout))));
    assert_eq!(registry.healthy_ids().unwrap(), vec![0, 2]);
}

#[tokio::test]
async fn test_loop_waits_one_interval_before_first_probe() {
    let (transport, registry) = registry(2).await;
    let shutdown = Shutdown::new();
    let handle = monitor(&registry, Duration::from_millis(300), Duration::from_millis(50))
        .spawn(shutdown.subscribe());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(transport.probe_count(), 0);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(transport.probe_count() >= 2);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("monitor should stop")
        .unwrap();
}

#[tokio::test]
async fn test_loop_demotes_then_repromotes() {
    let (transport, registry) = registry(2).await;
    transport.set_probe("E0", Behavior::Fail);

    let shutdown = Shutdown::new();
    let handle = monitor(&registry, Duration::from_millis(50), Duration::from_millis(20))
        .spawn(shutdown.subscribe());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(registry.healthy_ids().unwrap(), vec![1]);

    transport.set_probe("E0", Behavior::Succeed);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(registry.healthy_ids().unwrap(), vec![0, 1]);

    shutdown.trigger();
    handle.await.unwrap();

    let probes = transport.probe_count();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(transport.probe_count(), probes, "no probes after shutdown");
}

#[tokio::test]
async fn test_shutdown_during_hanging_probe_is_bounded_by_timeout() {
    let (transport, registry) = registry(2).await;
    transport.set_probe("E0", Behavior::Hang);
    transport.set_probe("E1", Behavior::Hang);

    let shutdown = Shutdown::new();
    let handle = monitor(&registry, Duration::from_millis(20), Duration::from_millis(200))
        .spawn(shutdown.subscribe());

    // Let a cycle start, then ask the monitor to stop mid-probe.
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("monitor must not wait on a hung probe indefinitely")
        .unwrap();
}

#[tokio::test]
async fn test_balancer_runs_monitor_and_closes_in_order() {
    let mut config = BalancerConfig::with_addresses(addresses(3));
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;

    let transport = ScriptedTransport::new();
    transport.set_probe("E1", Behavior::Fail);

    let balancer = Balancer::start(&config, transport.clone()).await.unwrap();
    assert!(balancer.has_health_monitor());
    assert_eq!(balancer.router().policy(), SelectionPolicy::HealthyRandom);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(balancer.registry().healthy_ids().unwrap(), vec![0, 2]);

    for _ in 0..50 {
        balancer.invoke(&"x".to_string()).await.unwrap();
    }
    assert!(transport.call_log().iter().all(|a| a != "E1"));

    let registry = balancer.registry().clone();
    balancer.close().await.unwrap();

    assert!(registry.is_closed());
    assert_eq!(transport.closed(), addresses(3));

    let probes = transport.probe_count();
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(transport.probe_count(), probes, "monitor stopped before close");
}

#[tokio::test]
async fn test_dropping_balancer_stops_monitor() {
    let mut config = BalancerConfig::with_addresses(addresses(1));
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;

    let transport = ScriptedTransport::new();
    let balancer = Balancer::start(&config, transport.clone()).await.unwrap();
    drop(balancer);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(transport.probe_count(), 0);
}
