use std::sync::Arc;

use keeper_blockchain::EvmChain;
use keeper_domain::{Category, MonitoredSet};
use keeper_proof_service::ProofServiceClient;

use crate::{
    config::Config,
    error::StartupError,
    periodic::{PeriodicTasksDeps, tasks::proof_push::ProofPushDeps},
    services::ProofSink,
};

pub(crate) struct CoreBootstrap {
    pub(crate) config: Config,
    pub(crate) chain: Arc<EvmChain>,
    pub(crate) monitored: MonitoredSet,
    pub(crate) periodic_deps: PeriodicTasksDeps,
}

pub(crate) async fn build_core(config: Config) -> Result<CoreBootstrap, StartupError> {
    let proof_client = Arc::new(ProofServiceClient::new(&config.proof_service)?);
    let chain = Arc::new(EvmChain::connect(config.chain.clone()).await?);

    let catalog = Arc::new(config.catalog.clone());
    let monitored = catalog.monitored_set(config.proof_push.pair_ids.as_deref());
    warn_about_unmonitorable_pairs(&monitored, |id| catalog.category_of(id));

    let periodic_deps = PeriodicTasksDeps {
        proof_push: ProofPushDeps {
            catalog,
            monitored: monitored.clone(),
            calendar: config.calendar.clone(),
            proof_source: proof_client,
            proof_sink: Arc::clone(&chain) as Arc<dyn ProofSink>,
        },
    };

    Ok(CoreBootstrap {
        config,
        chain,
        monitored,
        periodic_deps,
    })
}

fn warn_about_unmonitorable_pairs(
    monitored: &MonitoredSet,
    category_of: impl Fn(keeper_domain::PairId) -> Category,
) {
    if monitored.is_empty() {
        tracing::warn!("Monitored set is empty; every tick will be a no-op");
        return;
    }

    let unknown: Vec<_> = monitored
        .iter()
        .filter(|id| category_of(*id) == Category::Unknown)
        .collect();
    if !unknown.is_empty() {
        tracing::warn!(
            count = unknown.len(),
            pairs = %keeper_domain::PairId::join(&unknown),
            "Pairs with unknown category are never eligible"
        );
    }
}
