use crate::{client::ChainClient, collaborators::PayloadEstimator, config::GasPolicy};
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Middleware, PendingTransaction},
    signers::Signer,
    types::{
        transaction::eip2718::TypedTransaction, Address, Eip1559TransactionRequest,
        TransactionReceipt, H256, U256,
    },
};
use reclaim_primitives::{utils::as_hex_quantity, RawTransaction, Transaction, Wallet};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, trace};

/// Chain client backed by an ethers middleware
#[derive(Clone, Debug)]
pub struct EthereumClient<M> {
    /// Connection to the Ethereum execution client
    pub provider: Arc<M>,
    /// Receipt polling interval
    pub poll_interval: Duration,
}

impl<M> EthereumClient<M>
where
    M: Middleware + 'static,
{
    /// Create an Ethereum client
    ///
    /// # Arguments
    /// * `provider` - Connection to the Ethereum execution client
    /// * `poll_interval` - Receipt polling interval
    ///
    /// # Returns
    /// * `EthereumClient` - An [EthereumClient](EthereumClient)
    pub fn new(provider: Arc<M>, poll_interval: Duration) -> Self {
        Self { provider, poll_interval }
    }
}

#[async_trait]
impl<M> ChainClient for EthereumClient<M>
where
    M: Middleware + 'static,
{
    async fn chain_id(&self) -> eyre::Result<u64> {
        Ok(self.provider.get_chainid().await?.as_u64())
    }

    async fn estimate_gas(&self, tx: &TypedTransaction) -> eyre::Result<U256> {
        Ok(self.provider.estimate_gas(tx, None).await?)
    }

    async fn estimate_eip1559_fees(&self) -> eyre::Result<(U256, U256)> {
        Ok(self.provider.estimate_eip1559_fees(None).await?)
    }

    async fn gas_price(&self) -> eyre::Result<U256> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn send_transaction(&self, signer: &Wallet, tx: TypedTransaction) -> eyre::Result<H256> {
        let chain_id = match tx.chain_id() {
            Some(chain_id) => chain_id.as_u64(),
            None => self.chain_id().await?,
        };
        let client =
            SignerMiddleware::new(self.provider.clone(), signer.signer.clone().with_chain_id(chain_id));

        trace!("Sending transaction to the execution client: {tx:?}");
        let pending = client.send_transaction(tx, None).await?;

        Ok(pending.tx_hash())
    }

    async fn wait_for_confirmation(
        &self,
        hash: H256,
        confirmations: usize,
    ) -> eyre::Result<Option<TransactionReceipt>> {
        let receipt = PendingTransaction::new(hash, self.provider.provider())
            .interval(self.poll_interval)
            .confirmations(confirmations)
            .await?;

        trace!("Transaction receipt: {receipt:?}");

        Ok(receipt)
    }
}

#[async_trait]
impl<M> PayloadEstimator for EthereumClient<M>
where
    M: Middleware + 'static,
{
    async fn estimate_gas_for_payloads(
        &self,
        payloads: Vec<RawTransaction>,
        from: Address,
    ) -> eyre::Result<Vec<RawTransaction>> {
        let policy = GasPolicy::primary();
        let mut estimated = Vec::with_capacity(payloads.len());

        for (index, mut payload) in payloads.into_iter().enumerate() {
            let Ok(tx) = Transaction::validate(index, &payload) else {
                estimated.push(payload);
                continue;
            };

            let request: TypedTransaction = Eip1559TransactionRequest::new()
                .from(from)
                .to(tx.to)
                .data(tx.data)
                .value(tx.value)
                .into();

            match self.provider.estimate_gas(&request, None).await {
                Ok(gas) => {
                    payload.gas_limit = Some(Value::from(as_hex_quantity(&policy.apply(gas))));
                }
                Err(err) => debug!("Gas estimation of payload {index} failed: {err:?}"),
            }
            estimated.push(payload);
        }

        Ok(estimated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::{providers::Provider, types::U64};
    use serde_json::json;

    #[tokio::test]
    async fn chain_id_from_provider() {
        let (provider, mock) = Provider::mocked();
        mock.push::<U64, _>(U64::from(8453)).unwrap();

        let client = EthereumClient::new(Arc::new(provider), Duration::from_millis(10));
        assert_eq!(client.chain_id().await.unwrap(), 8453);
    }

    #[tokio::test]
    async fn legacy_gas_price_from_provider() {
        let (provider, mock) = Provider::mocked();
        mock.push::<U256, _>(U256::from(1_500_000_000u64)).unwrap();

        let client = EthereumClient::new(Arc::new(provider), Duration::from_millis(10));
        assert_eq!(client.gas_price().await.unwrap(), U256::from(1_500_000_000u64));
    }

    #[tokio::test]
    async fn payload_estimates_are_buffered() {
        let (provider, mock) = Provider::mocked();
        mock.push::<U256, _>(U256::from(100_000)).unwrap();

        let client = EthereumClient::new(Arc::new(provider), Duration::from_millis(10));
        let payloads: Vec<RawTransaction> = serde_json::from_value(json!([
            {"to": "0x1111111111111111111111111111111111111111"},
            {"to": "0x2222222222222222222222222222222222222222", "data": "0x01"},
        ]))
        .unwrap();

        let estimated = client.estimate_gas_for_payloads(payloads, Address::zero()).await.unwrap();
        assert_eq!(estimated.len(), 2);
        assert_eq!(estimated[0].gas_limit, None);
        // 150_000
        assert_eq!(estimated[1].gas_limit, Some(json!("0x249f0")));
    }
}
