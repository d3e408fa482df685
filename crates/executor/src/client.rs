use async_trait::async_trait;
use ethers::types::{transaction::eip2718::TypedTransaction, TransactionReceipt, H256, U256};
use reclaim_primitives::Wallet;

/// A trait for the chain operations the executor needs.
///
/// The signer is passed per call so one client can be shared by every run.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Chain id of the connected network
    async fn chain_id(&self) -> eyre::Result<u64>;

    /// Estimates the gas used by a transaction
    async fn estimate_gas(&self, tx: &TypedTransaction) -> eyre::Result<U256>;

    /// Estimates EIP-1559 fees
    ///
    /// # Returns
    /// * `(U256, U256)` - Max fee per gas and max priority fee per gas
    async fn estimate_eip1559_fees(&self) -> eyre::Result<(U256, U256)>;

    /// Gas price of legacy transactions
    async fn gas_price(&self) -> eyre::Result<U256>;

    /// Signs and submits a transaction.
    ///
    /// # Arguments
    /// * `signer` - The [Wallet](Wallet) signing the transaction
    /// * `tx` - The transaction
    ///
    /// # Returns
    /// * `H256` - The transaction hash
    async fn send_transaction(&self, signer: &Wallet, tx: TypedTransaction) -> eyre::Result<H256>;

    /// Waits until the transaction has the given number of confirmations.
    ///
    /// # Returns
    /// * `Option<TransactionReceipt>` - The receipt, or `None` if the transaction was dropped
    async fn wait_for_confirmation(
        &self,
        hash: H256,
        confirmations: usize,
    ) -> eyre::Result<Option<TransactionReceipt>>;
}
