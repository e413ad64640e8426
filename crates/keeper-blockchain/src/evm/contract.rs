use alloy::sol;

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    interface PullOracle {
        function verifyOracleProof(bytes calldata proof) external;
    }
}

pub(crate) const VERIFY_ORACLE_PROOF: &str = "verifyOracleProof";
