//! Scripted collaborators for tests
use crate::{
    client::ChainClient,
    collaborators::{
        InputValidator, MultisigProposal, PayloadEstimator, ProposalReceipt, SafeAdapter,
        UiHandler, WalletService,
    },
};
use async_trait::async_trait;
use ethers::types::{
    transaction::eip2718::TypedTransaction, Address, TransactionReceipt, H256, U256, U64,
};
use parking_lot::Mutex;
use reclaim_primitives::{utils::is_checksummed_address, RawTransaction, Wallet};
use serde_json::Value;
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

/// Well-known development key (first anvil account)
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn test_wallet() -> Wallet {
    Wallet::from_private_key(TEST_KEY).expect("valid test key")
}

/// How a scripted transaction behaves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behaviour {
    /// Mined with status 1
    Succeed,
    /// Mined with status 0
    Revert,
    /// `send_transaction` fails
    FailSubmission,
    /// `wait_for_confirmation` fails
    FailConfirmation,
    /// Dropped from the mempool
    Drop,
}

#[derive(Default)]
struct ChainState {
    script: VecDeque<Behaviour>,
    pending: HashMap<H256, Behaviour>,
    submitted: Vec<TypedTransaction>,
    estimated: Vec<TypedTransaction>,
    attempts: usize,
}

/// Chain client whose transactions follow a script. Unscripted transactions succeed.
#[derive(Clone)]
pub struct MockChainClient {
    chain_id: u64,
    estimate: Option<U256>,
    fees: (U256, U256),
    gas_price: U256,
    state: Arc<Mutex<ChainState>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self {
            chain_id: 8453,
            estimate: Some(U256::from(100_000)),
            fees: (U256::from(2_000_000_000u64), U256::from(1_000_000u64)),
            gas_price: U256::from(1_500_000_000u64),
            state: Arc::new(Mutex::new(ChainState::default())),
        }
    }

    /// Every gas estimation fails
    pub fn failing_estimation(mut self) -> Self {
        self.estimate = None;
        self
    }

    /// Behaviour of the next submissions, in order
    pub fn script(self, behaviours: impl IntoIterator<Item = Behaviour>) -> Self {
        self.state.lock().script.extend(behaviours);
        self
    }

    /// Transactions accepted by `send_transaction`
    pub fn submitted(&self) -> Vec<TypedTransaction> {
        self.state.lock().submitted.clone()
    }

    /// Transactions passed to `estimate_gas`
    pub fn estimated(&self) -> Vec<TypedTransaction> {
        self.state.lock().estimated.clone()
    }

    /// Calls to `send_transaction`, failed ones included
    pub fn attempts(&self) -> usize {
        self.state.lock().attempts
    }
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn chain_id(&self) -> eyre::Result<u64> {
        Ok(self.chain_id)
    }

    async fn estimate_gas(&self, tx: &TypedTransaction) -> eyre::Result<U256> {
        self.state.lock().estimated.push(tx.clone());
        self.estimate.ok_or_else(|| eyre::eyre!("execution reverted"))
    }

    async fn estimate_eip1559_fees(&self) -> eyre::Result<(U256, U256)> {
        Ok(self.fees)
    }

    async fn gas_price(&self) -> eyre::Result<U256> {
        Ok(self.gas_price)
    }

    async fn send_transaction(&self, _signer: &Wallet, tx: TypedTransaction) -> eyre::Result<H256> {
        let mut state = self.state.lock();
        state.attempts += 1;
        let behaviour = state.script.pop_front().unwrap_or(Behaviour::Succeed);
        if behaviour == Behaviour::FailSubmission {
            return Err(eyre::eyre!("nonce too low"));
        }

        state.submitted.push(tx);
        let hash = H256::from_low_u64_be(state.submitted.len() as u64);
        state.pending.insert(hash, behaviour);
        Ok(hash)
    }

    async fn wait_for_confirmation(
        &self,
        hash: H256,
        _confirmations: usize,
    ) -> eyre::Result<Option<TransactionReceipt>> {
        let behaviour = self.state.lock().pending.remove(&hash);
        let status = match behaviour {
            Some(Behaviour::Succeed) => 1u64,
            Some(Behaviour::Revert) => 0u64,
            Some(Behaviour::Drop) => return Ok(None),
            Some(Behaviour::FailConfirmation) => return Err(eyre::eyre!("connection reset")),
            Some(Behaviour::FailSubmission) | None => {
                return Err(eyre::eyre!("unknown transaction {hash:?}"))
            }
        };

        Ok(Some(TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(U64::from(100 + hash.to_low_u64_be())),
            gas_used: Some(U256::from(50_000)),
            status: Some(U64::from(status)),
            ..Default::default()
        }))
    }
}

/// Operator whose answers are scripted
#[derive(Clone, Default)]
pub struct MockUi {
    inputs: Arc<Mutex<VecDeque<String>>>,
    confirms: Arc<Mutex<VecDeque<bool>>>,
    selections: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    rejected: Arc<Mutex<usize>>,
}

impl MockUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(self, input: &str) -> Self {
        self.inputs.lock().push_back(input.to_string());
        self
    }

    pub fn confirm_with(self, answer: bool) -> Self {
        self.confirms.lock().push_back(answer);
        self
    }

    pub fn select(self, option: &str) -> Self {
        self.selections.lock().push_back(option.to_string());
        self
    }

    /// Every prompt shown, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Inputs refused by a validator
    pub fn rejected(&self) -> usize {
        *self.rejected.lock()
    }

    /// Confirmations asked for
    pub fn confirmations_asked(&self) -> usize {
        self.prompts.lock().iter().filter(|p| p.starts_with("confirm: ")).count()
    }
}

#[async_trait]
impl UiHandler for MockUi {
    async fn get_user_input(
        &self,
        prompt: &str,
        validator: InputValidator<'_>,
        _error_message: &str,
    ) -> eyre::Result<String> {
        self.prompts.lock().push(format!("input: {prompt}"));
        loop {
            let input = self
                .inputs
                .lock()
                .pop_front()
                .ok_or_else(|| eyre::eyre!("no scripted input for {prompt}"))?;
            if validator(&input) {
                return Ok(input);
            }
            *self.rejected.lock() += 1;
        }
    }

    async fn confirm(&self, prompt: &str) -> eyre::Result<bool> {
        self.prompts.lock().push(format!("confirm: {prompt}"));
        self.confirms.lock().pop_front().ok_or_else(|| eyre::eyre!("no scripted answer for {prompt}"))
    }

    async fn get_selection(&self, prompt: &str, options: &[String]) -> eyre::Result<String> {
        self.prompts.lock().push(format!("select: {prompt}"));
        let choice = self
            .selections
            .lock()
            .pop_front()
            .ok_or_else(|| eyre::eyre!("no scripted selection for {prompt}"))?;
        options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(&choice))
            .cloned()
            .ok_or_else(|| eyre::eyre!("{choice} is not one of {options:?}"))
    }
}

/// Safe service with canned answers
#[derive(Clone)]
pub struct MockSafeAdapter {
    safes: Result<Vec<Address>, String>,
    result: Result<ProposalReceipt, String>,
    proposals: Arc<Mutex<Vec<MultisigProposal>>>,
}

impl MockSafeAdapter {
    pub fn with_safes(safes: Vec<Address>) -> Self {
        Self {
            safes: Ok(safes),
            result: Ok(ProposalReceipt {
                safe_tx_hash: "0x1234".into(),
                transaction_url: "https://app.safe.global/transactions/tx?id=0x1234".into(),
            }),
            proposals: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Owner lookup fails
    pub fn unreachable() -> Self {
        Self { safes: Err("service unavailable".into()), ..Self::with_safes(vec![]) }
    }

    /// Proposals are rejected
    pub fn rejecting(mut self, message: &str) -> Self {
        self.result = Err(message.to_string());
        self
    }

    pub fn proposals(&self) -> Vec<MultisigProposal> {
        self.proposals.lock().clone()
    }
}

#[async_trait]
impl SafeAdapter for MockSafeAdapter {
    async fn get_safes_by_owner(&self, _owner: Address) -> eyre::Result<Vec<Address>> {
        self.safes.clone().map_err(|e| eyre::eyre!(e))
    }

    async fn execute(
        &self,
        proposal: &MultisigProposal,
        _signer: &Wallet,
    ) -> eyre::Result<ProposalReceipt> {
        self.proposals.lock().push(proposal.clone());
        self.result.clone().map_err(|e| eyre::eyre!(e))
    }
}

/// Wallet service holding one key unlocked by a fixed password
#[derive(Clone)]
pub struct MockWalletService {
    name: String,
    password: String,
}

impl MockWalletService {
    pub fn new(name: &str, password: &str) -> Self {
        Self { name: name.to_string(), password: password.to_string() }
    }
}

#[async_trait]
impl WalletService for MockWalletService {
    fn has_private_key(&self, name: &str) -> bool {
        name == self.name
    }

    async fn create_signer(&self, name: &str, password: &str) -> eyre::Result<Wallet> {
        if name != self.name || password != self.password {
            return Err(eyre::eyre!("invalid password for {name}"));
        }
        Ok(test_wallet())
    }

    fn is_valid_address(&self, address: &str) -> bool {
        is_checksummed_address(address)
    }
}

/// Payload estimator returning a fixed limit
#[derive(Clone)]
pub struct MockEstimator {
    limit: Option<U256>,
    requested: Arc<Mutex<usize>>,
}

impl MockEstimator {
    pub fn with_limit(limit: U256) -> Self {
        Self { limit: Some(limit), requested: Arc::new(Mutex::new(0)) }
    }

    pub fn failing() -> Self {
        Self { limit: None, requested: Arc::new(Mutex::new(0)) }
    }

    /// Payloads estimated so far
    pub fn requested(&self) -> usize {
        *self.requested.lock()
    }
}

impl Default for MockEstimator {
    fn default() -> Self {
        Self::with_limit(U256::from(100_000))
    }
}

#[async_trait]
impl PayloadEstimator for MockEstimator {
    async fn estimate_gas_for_payloads(
        &self,
        payloads: Vec<RawTransaction>,
        _from: Address,
    ) -> eyre::Result<Vec<RawTransaction>> {
        *self.requested.lock() += payloads.len();
        let limit = self.limit.ok_or_else(|| eyre::eyre!("estimation unavailable"))?;
        Ok(payloads
            .into_iter()
            .map(|mut p| {
                p.gas_limit = Some(Value::from(format!("{limit:#x}")));
                p
            })
            .collect())
    }
}
