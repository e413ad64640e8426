use std::future::Future;

use tokio::{select, signal::unix::SignalKind};
use tokio_util::sync::CancellationToken;

use super::{RuntimeDeps, shutdown};
use crate::{periodic, periodic::tasks::proof_push::ProofPushConfig};

pub(crate) async fn run(deps: RuntimeDeps, proof_push_config: ProofPushConfig) {
    run_until(deps, proof_push_config, shutdown_signal()).await;
}

/// Run the periodic tasks until `signal` resolves, then shut down gracefully.
pub(super) async fn run_until(
    deps: RuntimeDeps,
    proof_push_config: ProofPushConfig,
    signal: impl Future<Output = ()>,
) {
    let periodic_shutdown = CancellationToken::new();
    let periodic_handle = tokio::task::spawn(periodic::run_all(
        deps.periodic_deps,
        proof_push_config,
        periodic_shutdown.clone(),
    ));

    signal.await;

    shutdown::graceful_shutdown(shutdown::ShutdownContext {
        periodic_shutdown,
        periodic_handle,
    })
    .await;
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    let mut sigterm = match tokio::signal::unix::signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(error) => {
            tracing::warn!(error = %error, "Failed to install SIGTERM handler; only SIGINT stops the keeper");
            if let Err(error) = ctrl_c.await {
                tracing::error!(error = %error, "Failed to listen for SIGINT");
            }
            tracing::info!("Received SIGINT, initiating shutdown...");
            return;
        }
    };

    select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, initiating shutdown..."),
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating shutdown..."),
    }
}
