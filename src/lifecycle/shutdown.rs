//! Shutdown coordination for background tasks.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that long-running tasks subscribe to.
#[derive(Debug)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// A spawned task paired with the signal that stops it.
///
/// Dropping the handle signals the task without waiting for it.
#[derive(Debug)]
pub struct BackgroundTask {
    name: &'static str,
    shutdown: Shutdown,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundTask {
    /// Spawn the future built by `start`, handing it a shutdown receiver.
    pub fn spawn<F, Fut>(name: &'static str, start: F) -> Self
    where
        F: FnOnce(broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(start(shutdown.subscribe()));
        tracing::debug!(task = name, "Background task spawned");
        Self {
            name,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signal the task and wait for it to exit.
    pub async fn stop(mut self) {
        self.shutdown.trigger();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(task = self.name, error = %e, "Background task ended abnormally");
            }
        }
        tracing::debug!(task = self.name, "Background task stopped");
    }
}

impl Drop for BackgroundTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown.trigger();
        }
    }
}
