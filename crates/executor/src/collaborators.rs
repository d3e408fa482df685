//! Interfaces of the collaborators the engine consumes
use async_trait::async_trait;
use ethers::types::{Address, U256};
use reclaim_primitives::{BundleSummary, RawTransaction, Transaction, Wallet};

/// Key custody
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Whether a key with the given name is available
    fn has_private_key(&self, name: &str) -> bool;

    /// Unlocks the key with the given name
    async fn create_signer(&self, name: &str, password: &str) -> eyre::Result<Wallet>;

    /// Whether the string is an acceptable address
    fn is_valid_address(&self, address: &str) -> bool;
}

/// Validator applied to user input
pub type InputValidator<'a> = &'a (dyn Fn(&str) -> bool + Send + Sync);

/// Operator prompts
#[async_trait]
pub trait UiHandler: Send + Sync {
    /// Asks for a line of input until `validator` accepts it
    async fn get_user_input(
        &self,
        prompt: &str,
        validator: InputValidator<'_>,
        error_message: &str,
    ) -> eyre::Result<String>;

    /// Yes/no question
    async fn confirm(&self, prompt: &str) -> eyre::Result<bool>;

    /// Lets the operator pick one of the options, returns the option picked
    async fn get_selection(&self, prompt: &str, options: &[String]) -> eyre::Result<String>;
}

/// Request for a Safe to execute a bundle
#[derive(Clone, Debug)]
pub struct MultisigProposal {
    /// The Safe executing the calls
    pub safe_address: Address,
    /// The owner proposing (and signing) the transaction
    pub signer_address: Address,
    /// Summary of the bundle
    pub summary: BundleSummary,
    /// Calls to execute
    pub transactions: Vec<Transaction>,
}

/// Result of a successful proposal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalReceipt {
    /// Identifier assigned by the transaction service
    pub safe_tx_hash: String,
    /// Review link
    pub transaction_url: String,
}

/// Safe transaction coordination service
#[async_trait]
pub trait SafeAdapter: Send + Sync {
    /// Safes the address is an owner of
    async fn get_safes_by_owner(&self, owner: Address) -> eyre::Result<Vec<Address>>;

    /// Proposes the transactions to the Safe, signed by `signer`
    async fn execute(
        &self,
        proposal: &MultisigProposal,
        signer: &Wallet,
    ) -> eyre::Result<ProposalReceipt>;
}

/// Gas estimation of Safe-format call payloads
#[async_trait]
pub trait PayloadEstimator: Send + Sync {
    /// Returns the payloads with `gasLimit` set where estimation succeeded
    async fn estimate_gas_for_payloads(
        &self,
        payloads: Vec<RawTransaction>,
        from: Address,
    ) -> eyre::Result<Vec<RawTransaction>>;
}

/// Chain data attached to converted payloads
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionContext {
    pub from: Address,
    pub chain_id: u64,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}
