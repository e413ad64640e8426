mod registry;
mod runner;
pub(crate) mod tasks;

use tokio_util::sync::CancellationToken;

use self::{
    registry::{GlobalPeriodicTask, spawn_global_task},
    tasks::proof_push::{ProofPushConfig, ProofPushDeps, ProofPushTask},
};

pub(crate) struct PeriodicTasksDeps {
    pub(crate) proof_push: ProofPushDeps,
}

impl GlobalPeriodicTask for ProofPushTask {
    type Deps = ProofPushDeps;
    type Config = ProofPushConfig;

    fn from_deps(deps: Self::Deps, config: Self::Config) -> Self {
        ProofPushTask::new(deps, config)
    }

    fn run_task(self, shutdown: CancellationToken) -> impl std::future::Future<Output = ()> + Send {
        ProofPushTask::run(self, shutdown)
    }
}

/// Spawn every periodic task and wait for all of them to exit.
///
/// Tasks only exit on shutdown; panics are logged as they happen.
pub(crate) async fn run_all(
    deps: PeriodicTasksDeps,
    proof_push_config: ProofPushConfig,
    shutdown: CancellationToken,
) {
    let mut set = tokio::task::JoinSet::new();

    spawn_global_task::<ProofPushTask>(&mut set, deps.proof_push, &shutdown, proof_push_config);

    while let Some(result) = set.join_next().await {
        match result {
            Ok(()) => {}
            Err(e) if e.is_panic() => {
                tracing::error!("Periodic task panicked: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Periodic task failed: {:?}", e);
            }
        }
    }
}
