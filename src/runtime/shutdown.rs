use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Grace period for a tick in flight when shutdown is requested.
const PERIODIC_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

pub(super) struct ShutdownContext {
    pub(super) periodic_shutdown: CancellationToken,
    pub(super) periodic_handle: JoinHandle<()>,
}

pub(super) async fn graceful_shutdown(context: ShutdownContext) {
    graceful_shutdown_within(context, PERIODIC_SHUTDOWN_TIMEOUT).await;
}

async fn graceful_shutdown_within(context: ShutdownContext, timeout: Duration) {
    let ShutdownContext {
        periodic_shutdown,
        mut periodic_handle,
    } = context;

    tracing::info!("Shutting down gracefully...");

    // Periodic tasks observe the token between ticks, so a running tick completes first.
    periodic_shutdown.cancel();

    wait_for_shutdown_task("periodic_tasks", timeout, &mut periodic_handle).await;

    tracing::info!("Shutdown complete");
}

async fn wait_for_shutdown_task(
    task: &str,
    timeout: Duration,
    handle: &mut JoinHandle<()>,
) {
    match tokio::time::timeout(timeout, &mut *handle).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => tracing::error!(
            task,
            error = ?error,
            "Shutdown task panicked"
        ),
        Err(_) => {
            tracing::warn!(
                task,
                timeout_secs = timeout.as_secs(),
                "Shutdown timeout reached, aborting task"
            );
            handle.abort();
            let _ = handle.await;
        }
    }
}
