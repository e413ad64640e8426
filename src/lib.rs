//! Oracle keeper.
//!
//! Periodically pushes fresh price proofs for a monitored set of trading
//! pairs: pairs whose market is open are batched, a proof is fetched per
//! batch from the proof service, and each proof is submitted to the pull
//! oracle contract.

mod bootstrap;
mod config;
mod error;
mod logger;
mod periodic;
mod runtime;
mod services;

use std::process::ExitCode;

pub async fn run() -> ExitCode {
    let config = match config::initialize_configuration() {
        Ok(config) => config,
        Err(error) => {
            // The logger is configured from this file, so it is not up yet.
            eprintln!("Failed to load configuration: {}", error);
            return ExitCode::FAILURE;
        }
    };
    logger::initialize(&config.logger, &config.telemetry);

    let bootstrap::CoreBootstrap {
        config,
        chain,
        monitored,
        periodic_deps,
    } = match bootstrap::build_core(config).await {
        Ok(core) => core,
        Err(error) => {
            tracing::error!(error = %error, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("======================================================");
    tracing::info!("             Oracle Keeper v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("======================================================");
    tracing::info!(
        environment = %config.environment,
        chain_id = chain.chain_id(),
        rpc_endpoint = %chain.config().primary_endpoint(),
        fallback_endpoints = chain.config().rpc_endpoints().len().saturating_sub(1),
        contract = %chain.contract_address(),
        signer = %chain.signer_address(),
        "Connected to chain"
    );
    tracing::info!(
        proof_service = config.proof_service.base_url.as_deref().unwrap_or_default(),
        monitored = %monitored.summary(),
        interval_ms = config.proof_push.interval.as_millis() as u64,
        batch_size = config.proof_push.batch_size.get(),
        "Keeper started"
    );

    runtime::run(runtime::RuntimeDeps { periodic_deps }, config.proof_push).await;

    ExitCode::SUCCESS
}
