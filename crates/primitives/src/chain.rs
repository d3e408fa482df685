//! Chain extensions
use alloy_chains::{Chain, NamedChain};

pub trait ChainExt {
    /// Base URL of the Safe transaction service for the chain
    fn safe_service_url(&self) -> Option<&'static str>;

    /// EIP-3770 short name used by the Safe web application
    fn safe_short_name(&self) -> Option<&'static str>;

    /// Link to a queued Safe transaction in the Safe web application
    fn safe_transaction_url(&self, app_url: &str, safe: &str, safe_tx_hash: &str) -> String {
        let prefix = self.safe_short_name().unwrap_or("eth");
        let app_url = app_url.trim_end_matches('/');
        format!("{app_url}/transactions/tx?safe={prefix}:{safe}&id=multisig_{safe}_{safe_tx_hash}")
    }
}

impl ChainExt for Chain {
    fn safe_service_url(&self) -> Option<&'static str> {
        match self.named()? {
            NamedChain::Mainnet => Some("https://safe-transaction-mainnet.safe.global"),
            NamedChain::Optimism => Some("https://safe-transaction-optimism.safe.global"),
            NamedChain::Arbitrum => Some("https://safe-transaction-arbitrum.safe.global"),
            NamedChain::Polygon => Some("https://safe-transaction-polygon.safe.global"),
            NamedChain::Base => Some("https://safe-transaction-base.safe.global"),
            NamedChain::Gnosis => Some("https://safe-transaction-gnosis-chain.safe.global"),
            NamedChain::Sepolia => Some("https://safe-transaction-sepolia.safe.global"),
            _ => None,
        }
    }

    fn safe_short_name(&self) -> Option<&'static str> {
        match self.named()? {
            NamedChain::Mainnet => Some("eth"),
            NamedChain::Optimism => Some("oeth"),
            NamedChain::Arbitrum => Some("arb1"),
            NamedChain::Polygon => Some("matic"),
            NamedChain::Base => Some("base"),
            NamedChain::Gnosis => Some("gno"),
            NamedChain::Sepolia => Some("sep"),
            _ => None,
        }
    }
}
