//! Graceful shutdown coordination via `CancellationToken`.

use std::sync::Arc;
use std::time::Duration;

use rexpro_session::SessionRegistry;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default timeout for draining tasks before giving up on them.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Signals server tasks to stop and tears down session state afterwards.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal every holder of a token to stop. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Cancel the token, wait up to `timeout` for `handles`, then destroy
    /// every session still registered. Returns how many were destroyed.
    pub async fn graceful_shutdown(
        &self,
        handles: Vec<JoinHandle<()>>,
        registry: &Arc<SessionRegistry>,
        timeout: Option<Duration>,
    ) -> usize {
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);

        self.shutdown();
        info!(
            task_count = handles.len(),
            timeout_secs = timeout.as_secs(),
            "waiting for tasks to complete"
        );

        if tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_err()
        {
            warn!("shutdown timed out after {timeout:?}, some tasks may still be running");
        }

        let destroyed = registry.destroy_all();
        info!(destroyed, "sessions released");
        destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rexpro_core::{Channel, SessionId};
    use rexpro_session::StaticGraphs;

    #[test]
    fn token_propagation() {
        let coord = ShutdownCoordinator::new();
        let token = coord.token();
        assert!(!token.is_cancelled());
        coord.shutdown();
        coord.shutdown();
        assert!(token.is_cancelled());
        assert!(coord.token().is_cancelled());
    }

    #[tokio::test]
    async fn graceful_shutdown_waits_and_clears_registry() {
        let coord = ShutdownCoordinator::new();
        let registry = Arc::new(SessionRegistry::new());
        for _ in 0..3 {
            let _ = registry
                .create(SessionId::new(), Arc::new(StaticGraphs::new()), Channel::MsgPack)
                .unwrap();
        }

        let token = coord.token();
        let task = tokio::spawn(async move { token.cancelled().await });

        let destroyed = coord
            .graceful_shutdown(vec![task], &registry, Some(Duration::from_secs(1)))
            .await;
        assert_eq!(destroyed, 3);
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_shutdown_times_out_on_stuck_task() {
        let coord = ShutdownCoordinator::new();
        let registry = Arc::new(SessionRegistry::new());
        let stuck = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        let destroyed = coord
            .graceful_shutdown(vec![stuck], &registry, Some(Duration::from_millis(50)))
            .await;
        assert_eq!(destroyed, 0);
    }
}
