use std::time::Duration;

use alloy::{
    contract::Error as ContractError,
    transports::{RpcError, TransportErrorKind},
};

const BUMP_GAS_PATTERNS: [&str; 10] = [
    "replacement transaction underpriced",
    "transaction underpriced",
    "fee too low",
    "max fee per gas less than block base fee",
    "max fee per gas less than block basefee",
    "priority fee too low",
    "nonce too low",
    "nonce is too low",
    "nonce has already been used",
    "already known",
];

pub(crate) fn rpc_backoff_hint(err: &RpcError<TransportErrorKind>) -> Option<Duration> {
    let RpcError::ErrorResp(payload) = err else {
        return None;
    };

    let data = payload.try_data_as::<serde_json::Value>()?;
    let Ok(data) = data else {
        return None;
    };

    let backoff_seconds = data["rate"]["backoff_seconds"].as_f64()?;
    Some(Duration::from_secs(backoff_seconds.ceil() as u64))
}

pub(crate) fn contract_error_backoff_hint(err: &ContractError) -> Option<Duration> {
    match err {
        ContractError::TransportError(inner) => rpc_backoff_hint(inner),
        _ => None,
    }
}

/// Whether the node rejected the transaction for its fee or nonce, so the
/// next submission should go out with a bumped fee.
pub(crate) fn should_bump_gas_price(err: &ContractError) -> bool {
    if err.as_revert_data().is_some() {
        return false;
    }

    is_underpriced_message(&contract_error_message(err))
}

fn is_underpriced_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    BUMP_GAS_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
}

fn contract_error_message(err: &ContractError) -> String {
    match err {
        ContractError::TransportError(inner) => rpc_error_message(inner),
        _ => err.to_string(),
    }
}

fn rpc_error_message(err: &RpcError<TransportErrorKind>) -> String {
    match err {
        RpcError::ErrorResp(payload) => payload.to_string(),
        RpcError::Transport(TransportErrorKind::HttpError(http)) => http.body.clone(),
        RpcError::Transport(TransportErrorKind::Custom(custom)) => custom.to_string(),
        RpcError::DeserError { text, .. } => text.clone(),
        _ => err.to_string(),
    }
}
