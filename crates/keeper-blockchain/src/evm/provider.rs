use std::{num::NonZeroUsize, sync::Arc};

use alloy::{
    network::{Ethereum, EthereumWallet},
    providers::{DynProvider, Provider, ProviderBuilder, WsConnect},
    rpc::client::RpcClient,
    transports::{
        BoxTransport, IntoBoxTransport,
        http::{Http, reqwest::Url},
        layers::FallbackLayer,
    },
};
use tower::ServiceBuilder;

use crate::BlockchainError;

pub type BlockchainProvider = Arc<DynProvider<Ethereum>>;

/// Build a signing provider over every usable endpoint. Endpoints are tried
/// one at a time; the fallback layer moves to the next only on failure.
pub(crate) async fn initialize_provider_with_wallet(
    rpc_endpoints: &[String],
    wallet: EthereumWallet,
) -> Result<BlockchainProvider, BlockchainError> {
    let mut transports: Vec<BoxTransport> = Vec::new();
    let mut valid_endpoints = Vec::new();

    for endpoint in rpc_endpoints {
        if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
            match RpcClient::connect_pubsub(WsConnect::new(endpoint.as_str())).await {
                Ok(client) => {
                    transports.push(client.transport().clone().into_box_transport());
                    valid_endpoints.push(endpoint.as_str());
                    tracing::debug!(endpoint = %endpoint, "WebSocket RPC endpoint added");
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Failed to connect to WebSocket RPC");
                }
            }
        } else {
            match endpoint.parse::<Url>() {
                Ok(url) => {
                    transports.push(Http::new(url).into_box_transport());
                    valid_endpoints.push(endpoint.as_str());
                    tracing::debug!(endpoint = %endpoint, "HTTP RPC endpoint added");
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Invalid RPC URL");
                }
            }
        }
    }

    if transports.is_empty() {
        return Err(BlockchainError::RpcConnectionFailed {
            attempts: rpc_endpoints.len(),
        });
    }

    let fallback_layer = FallbackLayer::default().with_active_transport_count(NonZeroUsize::MIN);
    let transport = ServiceBuilder::new()
        .layer(fallback_layer)
        .service(transports);
    let client = RpcClient::builder().transport(transport, false);
    let provider = ProviderBuilder::new().wallet(wallet).connect_client(client);

    match provider.get_block_number().await {
        Ok(block) => {
            tracing::info!(
                endpoints = valid_endpoints.len(),
                block,
                "Chain provider initialized"
            );
            Ok(Arc::new(provider.erased()))
        }
        Err(e) => {
            tracing::error!(error = %e, "All RPC endpoints failed connectivity check");
            Err(BlockchainError::RpcConnectionFailed {
                attempts: valid_endpoints.len(),
            })
        }
    }
}
