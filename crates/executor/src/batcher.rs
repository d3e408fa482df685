use crate::{
    aggregator::ResultAggregator,
    client::ChainClient,
    collaborators::UiHandler,
    config::{BatchPolicy, ExecutorConfig, GasPolicy, RetryPolicy},
    errors::ExecutionError,
    multisend::build_batch,
    sequential::SequentialExecutor,
};
use reclaim_primitives::{
    ExecutionResult, OnRevert, RawTransaction, SkippedTransaction, Transaction, TxOutcome, TxStatus,
    Wallet,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Validates candidate transactions. Invalid ones are skipped with the reason, never defaulted.
pub fn validate_transactions(
    candidates: &[RawTransaction],
) -> (Vec<Transaction>, Vec<SkippedTransaction>) {
    let mut valid = Vec::with_capacity(candidates.len());
    let mut skipped = vec![];

    for (index, raw) in candidates.iter().enumerate() {
        match Transaction::validate(index, raw) {
            Ok(tx) => valid.push(tx),
            Err(err) => {
                warn!("Skipping transaction {index}: {err}");
                skipped.push(SkippedTransaction { index, reason: err.to_string() });
            }
        }
    }

    if !skipped.is_empty() {
        warn!("{} of {} transactions skipped by validation", skipped.len(), candidates.len());
    }

    (valid, skipped)
}

/// Decides between one atomic multisend submission and sequential sending
#[derive(Clone)]
pub struct TransactionBatcher<C>
where
    C: ChainClient,
{
    sequential: SequentialExecutor<C>,
    ui: Arc<dyn UiHandler>,
    batch: BatchPolicy,
    retry: RetryPolicy,
    fallback_gas: GasPolicy,
}

impl<C> TransactionBatcher<C>
where
    C: ChainClient,
{
    pub fn new(chain: Arc<C>, ui: Arc<dyn UiHandler>, config: &ExecutorConfig) -> Self {
        Self {
            sequential: SequentialExecutor::new(chain, config),
            ui,
            batch: config.batch,
            retry: config.retry,
            fallback_gas: config.fallback_gas,
        }
    }

    /// Validates and sends the transactions from the signer's address.
    ///
    /// A single valid transaction is always sent directly. Several transactions are sent one
    /// by one unless atomic batching is enabled and confirmed by the operator.
    ///
    /// # Arguments
    /// * `candidates` - Transactions of the normalized bundle
    /// * `signer` - The [Wallet](Wallet) sending them
    ///
    /// # Returns
    /// * `ExecutionResult` - Per-transaction outcomes, skipped transactions included
    pub async fn batch(
        &self,
        candidates: &[RawTransaction],
        signer: &Wallet,
    ) -> eyre::Result<ExecutionResult> {
        let (txs, skipped) = validate_transactions(candidates);

        let mut result = match txs.len() {
            0 => {
                warn!("No valid transactions to send");
                ResultAggregator::new().finish()
            }
            1 => {
                info!("Single transaction, sending directly");
                self.sequential.run(&txs, signer).await?
            }
            _ if self.batch.atomic => self.atomic(&txs, signer).await?,
            n => {
                info!("Sending {n} transactions sequentially to keep the operator as caller");
                self.sequential.run(&txs, signer).await?
            }
        };

        result.skipped.extend(skipped);
        result.skipped.sort_by_key(|s| s.index);

        Ok(result)
    }

    async fn atomic(&self, txs: &[Transaction], signer: &Wallet) -> eyre::Result<ExecutionResult> {
        let prompt = format!(
            "Send {} transactions as one atomic batch through {:?}? The multisend contract becomes \
             msg.sender of every call, calls checking the caller will revert",
            txs.len(),
            self.batch.multisend
        );
        if !self.ui.confirm(&prompt).await? {
            info!("Atomic batch declined, sending sequentially");
            return self.sequential.run(txs, signer).await;
        }

        let batch = build_batch(txs, self.batch.multisend);
        let chain_id = self.sequential.chain.chain_id().await?;
        let fees = self.sequential.resolve_fees(std::slice::from_ref(&batch)).await?;

        info!("Sending atomic batch of {} calls to {:?}", txs.len(), self.batch.multisend);
        let outcome = self.sequential.submit(&batch, signer, chain_id, &fees).await;

        match &outcome.status {
            TxStatus::Reverted { hash, .. } => {
                warn!("{}", ExecutionError::Reverted { hash: *hash });
                if self.fall_back().await? {
                    info!("Falling back to sequential sending");
                    self.sequential.pause().await;
                    self.sequential.with_gas_policy(self.fallback_gas).run(txs, signer).await
                } else {
                    Ok(Self::per_call(txs, &outcome.status))
                }
            }
            status => {
                if status.is_success() {
                    info!("Atomic batch confirmed");
                }
                Ok(Self::per_call(txs, status))
            }
        }
    }

    async fn fall_back(&self) -> eyre::Result<bool> {
        match self.retry.on_revert {
            OnRevert::AlwaysFallback => Ok(true),
            OnRevert::NeverFallback => Ok(false),
            OnRevert::AskOperator => {
                self.ui.confirm("Atomic batch reverted. Send the transactions one by one?").await
            }
        }
    }

    /// Every call of a batch shares the outcome of the batch transaction
    fn per_call(txs: &[Transaction], status: &TxStatus) -> ExecutionResult {
        ResultAggregator::aggregate(
            txs.iter()
                .map(|tx| TxOutcome { index: tx.index, to: tx.to, status: status.clone() })
                .collect(),
        )
    }
}
