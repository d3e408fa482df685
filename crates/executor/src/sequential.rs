use crate::{
    aggregator::ResultAggregator,
    client::ChainClient,
    config::{ExecutorConfig, FeeConfig, GasPolicy},
    errors::ExecutionError,
};
use ethers::types::{
    transaction::eip2718::TypedTransaction, Address, Eip1559TransactionRequest,
    TransactionRequest, H256, U256, U64,
};
use reclaim_primitives::{ExecutionResult, Transaction, TxKind, TxOutcome, TxStatus, Wallet};
use std::{sync::Arc, time::Duration};
use tracing::{info, trace, warn};

/// Fees applied to every transaction of a run that does not carry its own
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedFees {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    /// Only resolved when a legacy transaction of the run carries none
    pub gas_price: Option<U256>,
}

/// Sends transactions one at a time, in order, from the operator's own address
#[derive(Clone, Debug)]
pub struct SequentialExecutor<C>
where
    C: ChainClient,
{
    /// Chain client
    pub chain: Arc<C>,
    /// Gas limit policy
    pub gas: GasPolicy,
    /// Configured fees
    pub fees: FeeConfig,
    /// Delay between two submissions
    pub delay: Duration,
    /// Confirmations awaited per transaction
    pub confirmations: usize,
}

impl<C> SequentialExecutor<C>
where
    C: ChainClient,
{
    /// Creates an executor using the primary gas policy of the configuration
    pub fn new(chain: Arc<C>, config: &ExecutorConfig) -> Self {
        Self {
            chain,
            gas: config.gas,
            fees: config.fees,
            delay: config.inter_tx_delay,
            confirmations: config.confirmations,
        }
    }

    /// Same executor with another gas policy
    pub fn with_gas_policy(&self, gas: GasPolicy) -> Self {
        Self {
            chain: self.chain.clone(),
            gas,
            fees: self.fees,
            delay: self.delay,
            confirmations: self.confirmations,
        }
    }

    /// Sends the transactions one by one.
    ///
    /// Failures of individual transactions are recorded and the run continues with the next
    /// transaction.
    ///
    /// # Arguments
    /// * `txs` - The validated transactions, in submission order
    /// * `signer` - The [Wallet](Wallet) sending them
    ///
    /// # Returns
    /// * `ExecutionResult` - Outcome of every transaction
    pub async fn run(&self, txs: &[Transaction], signer: &Wallet) -> eyre::Result<ExecutionResult> {
        let mut aggregator = ResultAggregator::new();
        if txs.is_empty() {
            info!("Skipping execution, no transactions");
            return Ok(aggregator.finish());
        }

        let chain_id = self.chain.chain_id().await?;
        let fees = self.resolve_fees(txs).await?;

        info!(
            "Sending {} transactions from {:?} one by one (chain {chain_id})",
            txs.len(),
            signer.address()
        );

        for (pos, tx) in txs.iter().enumerate() {
            if pos > 0 {
                self.pause().await;
            }

            info!("Transaction {}/{} to {:?}", pos + 1, txs.len(), tx.to);
            let outcome = self.submit(tx, signer, chain_id, &fees).await;
            aggregator.record(outcome);
        }

        let result = aggregator.finish();
        info!("Sequential execution finished: {result}");

        Ok(result)
    }

    /// Waits the delay between two submissions
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Configured fees, estimated from the chain when not configured. The gas price is only
    /// queried when a legacy transaction carries none.
    pub async fn resolve_fees(&self, txs: &[Transaction]) -> eyre::Result<ResolvedFees> {
        let (max_fee_per_gas, max_priority_fee_per_gas) =
            match (self.fees.max_fee_per_gas, self.fees.max_priority_fee_per_gas) {
                (Some(max_fee), Some(priority_fee)) => (max_fee, priority_fee),
                (max_fee, priority_fee) => {
                    let (estimated_max, estimated_priority) =
                        self.chain.estimate_eip1559_fees().await?;
                    (max_fee.unwrap_or(estimated_max), priority_fee.unwrap_or(estimated_priority))
                }
            };

        let unpriced_legacy =
            txs.iter().any(|tx| tx.kind == TxKind::Legacy && tx.fees.gas_price.is_none());
        let gas_price = match self.fees.gas_price {
            Some(gas_price) => Some(gas_price),
            None if unpriced_legacy => Some(self.chain.gas_price().await?),
            None => None,
        };

        Ok(ResolvedFees {
            max_fee_per_gas,
            max_priority_fee_per_gas: max_priority_fee_per_gas.min(max_fee_per_gas),
            gas_price,
        })
    }

    /// Builds the submission request of a transaction, without gas limit
    pub fn build_request(
        &self,
        tx: &Transaction,
        from: Address,
        chain_id: u64,
        fees: &ResolvedFees,
    ) -> TypedTransaction {
        match tx.kind {
            TxKind::Legacy => TypedTransaction::Legacy(TransactionRequest {
                from: Some(from),
                to: Some(tx.to.into()),
                value: Some(tx.value),
                data: Some(tx.data.clone()),
                gas_price: tx.fees.gas_price.or(fees.gas_price),
                chain_id: Some(U64::from(chain_id)),
                ..Default::default()
            }),
            TxKind::Eip1559 => TypedTransaction::Eip1559(Eip1559TransactionRequest {
                from: Some(from),
                to: Some(tx.to.into()),
                value: Some(tx.value),
                data: Some(tx.data.clone()),
                chain_id: Some(U64::from(chain_id)),
                max_fee_per_gas: Some(tx.fees.max_fee_per_gas.unwrap_or(fees.max_fee_per_gas)),
                max_priority_fee_per_gas: Some(
                    tx.fees.max_priority_fee_per_gas.unwrap_or(fees.max_priority_fee_per_gas),
                ),
                ..Default::default()
            }),
        }
    }

    /// Gas limit of a request: buffered estimate, or the policy default if estimation fails
    pub async fn gas_limit(&self, request: &TypedTransaction) -> U256 {
        match self.chain.estimate_gas(request).await {
            Ok(estimate) => {
                let limit = self.gas.apply(estimate);
                trace!("Estimated gas {estimate}, using limit {limit}");
                limit
            }
            Err(err) => {
                let err = ExecutionError::Estimation { inner: err.to_string() };
                warn!("{err}, using default gas limit {}", self.gas.default_limit());
                self.gas.default_limit()
            }
        }
    }

    /// Submits one transaction and waits for its confirmation
    pub async fn submit(
        &self,
        tx: &Transaction,
        signer: &Wallet,
        chain_id: u64,
        fees: &ResolvedFees,
    ) -> TxOutcome {
        let mut request = self.build_request(tx, signer.address(), chain_id, fees);
        let gas = match tx.gas_limit {
            Some(gas) => gas,
            None => self.gas_limit(&request).await,
        };
        request.set_gas(gas);

        let status = self.send_and_confirm(request, signer).await;
        TxOutcome { index: tx.index, to: tx.to, status }
    }

    /// Sends a complete request and classifies its receipt
    pub async fn send_and_confirm(&self, request: TypedTransaction, signer: &Wallet) -> TxStatus {
        trace!("Sending transaction: {request:?}");

        let hash = match self.chain.send_transaction(signer, request).await {
            Ok(hash) => hash,
            Err(err) => {
                let err = ExecutionError::Submission { inner: err.to_string() };
                warn!("{err}");
                return TxStatus::Failed { hash: None, error: err.to_string() };
            }
        };
        info!("Transaction submitted, hash: {hash:?}");

        self.confirm(hash).await
    }

    async fn confirm(&self, hash: H256) -> TxStatus {
        match self.chain.wait_for_confirmation(hash, self.confirmations).await {
            Ok(Some(receipt)) => {
                trace!("Transaction receipt: {receipt:?}");
                let block = receipt.block_number;
                let gas_used = receipt.gas_used;
                if receipt.status == Some(U64::from(1)) {
                    info!("Transaction {hash:?} confirmed in block {block:?}");
                    TxStatus::Confirmed { hash, block, gas_used }
                } else {
                    warn!("Transaction {hash:?} reverted in block {block:?}");
                    TxStatus::Reverted { hash, block, gas_used }
                }
            }
            Ok(None) => {
                let err = ExecutionError::Dropped { hash };
                warn!("{err}");
                TxStatus::Failed { hash: Some(hash), error: err.to_string() }
            }
            Err(err) => {
                let err = ExecutionError::Confirmation { hash, inner: err.to_string() };
                warn!("{err}");
                TxStatus::Failed { hash: Some(hash), error: err.to_string() }
            }
        }
    }
}
