use alloy::{
    network::EthereumWallet,
    signers::local::{LocalSignerError, PrivateKeySigner},
};

use crate::BlockchainError;

pub(crate) fn signer_from_private_key(
    private_key: &str,
) -> Result<PrivateKeySigner, BlockchainError> {
    let private_key = private_key.trim();
    private_key
        .parse()
        .map_err(|e: LocalSignerError| BlockchainError::InvalidPrivateKey {
            key_length: private_key.len(),
            source: e,
        })
}

pub(crate) fn wallet_from_private_key(private_key: &str) -> Result<EthereumWallet, BlockchainError> {
    Ok(EthereumWallet::from(signer_from_private_key(private_key)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_and_bare_keys() {
        let bare = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let prefixed = format!("0x{}", bare);
        let a = signer_from_private_key(bare).unwrap();
        let b = signer_from_private_key(&prefixed).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn reports_length_of_bad_key() {
        let err = signer_from_private_key("0xdead").unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::InvalidPrivateKey { key_length: 6, .. }
        ));
    }
}
