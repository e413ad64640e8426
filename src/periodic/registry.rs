use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub(crate) trait GlobalPeriodicTask: Send + 'static {
    type Deps: Send + 'static;
    type Config: Send + 'static;

    fn from_deps(deps: Self::Deps, config: Self::Config) -> Self;

    fn run_task(self, shutdown: CancellationToken) -> impl Future<Output = ()> + Send;
}

pub(crate) fn spawn_global_task<T: GlobalPeriodicTask>(
    set: &mut JoinSet<()>,
    deps: T::Deps,
    shutdown: &CancellationToken,
    config: T::Config,
) {
    let shutdown = shutdown.clone();
    set.spawn(async move {
        T::from_deps(deps, config).run_task(shutdown).await;
    });
}
