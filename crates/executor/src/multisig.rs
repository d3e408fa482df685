use crate::{
    batcher::validate_transactions,
    collaborators::{MultisigProposal, ProposalReceipt, SafeAdapter, UiHandler, WalletService},
    normalizer::BundleNormalizer,
    signer::acquire_signer,
};
use ethers::{types::Address, utils::to_checksum};
use reclaim_primitives::{
    utils::{is_checksummed_address, parse_checksummed_address},
    Bundle, Transaction, Wallet,
};
use std::{fmt, path::PathBuf, sync::Arc};
use tracing::{debug, info, warn};

/// Selection entry leading to manual address entry
pub const MANUAL_ENTRY: &str = "Enter address manually";

/// States of a proposal
#[derive(Clone, Debug)]
pub enum ProposalState {
    AwaitingSigner,
    DiscoveringWallets { signer: Wallet },
    /// Empty `candidates` means the address has to be entered manually
    SelectingWallet { signer: Wallet, candidates: Vec<Address> },
    ConfirmingProposal { signer: Wallet, safe: Address },
    Proposed(ProposalReceipt),
    Cancelled,
    Failed { message: String, output_file: Option<PathBuf> },
}

impl ProposalState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Proposed(_) | Self::Cancelled | Self::Failed { .. })
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingSigner => write!(f, "awaiting signer"),
            Self::DiscoveringWallets { .. } => write!(f, "discovering wallets"),
            Self::SelectingWallet { .. } => write!(f, "selecting wallet"),
            Self::ConfirmingProposal { safe, .. } => write!(f, "confirming proposal to {safe:?}"),
            Self::Proposed(receipt) => write!(f, "proposed ({})", receipt.safe_tx_hash),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed { message, .. } => write!(f, "failed ({message})"),
        }
    }
}

/// Proposes a bundle to a Safe the signer is an owner of
#[derive(Clone)]
pub struct MultisigProposalFlow {
    wallets: Arc<dyn WalletService>,
    ui: Arc<dyn UiHandler>,
    safe: Arc<dyn SafeAdapter>,
}

impl MultisigProposalFlow {
    pub fn new(
        wallets: Arc<dyn WalletService>,
        ui: Arc<dyn UiHandler>,
        safe: Arc<dyn SafeAdapter>,
    ) -> Self {
        Self { wallets, ui, safe }
    }

    /// Runs the proposal flow until a terminal state.
    ///
    /// Only structural failures (normalization, signer) are returned as errors. A rejected
    /// proposal ends in [ProposalState::Failed].
    pub async fn run(&self, bundle: &Bundle, wallet_name: &str) -> eyre::Result<ProposalState> {
        let normalized = BundleNormalizer::normalize_for_proposal(bundle)?;
        let (transactions, skipped) = validate_transactions(&normalized.transactions);
        if transactions.is_empty() {
            return Ok(ProposalState::Failed {
                message: format!(
                    "no valid transactions to propose ({} skipped)",
                    skipped.len()
                ),
                output_file: bundle.output_file.clone(),
            });
        }

        let mut state = ProposalState::AwaitingSigner;
        while !state.is_terminal() {
            debug!("Proposal flow: {state}");
            state = self.step(state, bundle, wallet_name, &transactions).await?;
        }

        info!("Proposal flow {state}");

        Ok(state)
    }

    async fn step(
        &self,
        state: ProposalState,
        bundle: &Bundle,
        wallet_name: &str,
        transactions: &[Transaction],
    ) -> eyre::Result<ProposalState> {
        Ok(match state {
            ProposalState::AwaitingSigner => {
                let signer =
                    acquire_signer(self.wallets.as_ref(), self.ui.as_ref(), wallet_name).await?;
                ProposalState::DiscoveringWallets { signer }
            }
            ProposalState::DiscoveringWallets { signer } => {
                let candidates = match self.safe.get_safes_by_owner(signer.address()).await {
                    Ok(safes) => safes,
                    Err(err) => {
                        warn!("Could not look up Safes owned by {:?}: {err}", signer.address());
                        vec![]
                    }
                };
                ProposalState::SelectingWallet { signer, candidates }
            }
            ProposalState::SelectingWallet { signer, candidates } => {
                let safe = self.select_wallet(&candidates).await?;
                ProposalState::ConfirmingProposal { signer, safe }
            }
            ProposalState::ConfirmingProposal { signer, safe } => {
                let prompt = format!(
                    "Propose {} transactions ({}) to Safe {}?",
                    transactions.len(),
                    bundle.summary,
                    to_checksum(&safe, None)
                );
                if !self.ui.confirm(&prompt).await? {
                    return Ok(ProposalState::Cancelled);
                }

                let proposal = MultisigProposal {
                    safe_address: safe,
                    signer_address: signer.address(),
                    summary: bundle.summary.clone(),
                    transactions: transactions.to_vec(),
                };
                match self.safe.execute(&proposal, &signer).await {
                    Ok(receipt) => {
                        info!("Transaction proposed, review it at {}", receipt.transaction_url);
                        ProposalState::Proposed(receipt)
                    }
                    Err(err) => {
                        match &bundle.output_file {
                            Some(path) => warn!(
                                "Proposal failed: {err}. Upload {path:?} to the Safe app manually"
                            ),
                            None => warn!("Proposal failed: {err}. Upload the bundle to the Safe app manually"),
                        }
                        ProposalState::Failed {
                            message: err.to_string(),
                            output_file: bundle.output_file.clone(),
                        }
                    }
                }
            }
            terminal => terminal,
        })
    }

    async fn select_wallet(&self, candidates: &[Address]) -> eyre::Result<Address> {
        if candidates.is_empty() {
            info!("No Safes found for the signer");
            return self.enter_address().await;
        }

        let mut options: Vec<String> = candidates.iter().map(|a| to_checksum(a, None)).collect();
        options.push(MANUAL_ENTRY.to_string());

        let choice = self.ui.get_selection("Select the Safe to propose to", &options).await?;
        if choice == MANUAL_ENTRY {
            return self.enter_address().await;
        }

        candidates
            .iter()
            .find(|a| to_checksum(a, None) == choice)
            .copied()
            .ok_or_else(|| eyre::eyre!("{choice} is not one of the offered Safes"))
    }

    async fn enter_address(&self) -> eyre::Result<Address> {
        let wallets = self.wallets.clone();
        let validator =
            move |input: &str| is_checksummed_address(input) && wallets.is_valid_address(input);

        let input = self
            .ui
            .get_user_input("Safe address", &validator, "Enter a valid checksummed address")
            .await?;

        parse_checksummed_address(&input).ok_or_else(|| eyre::eyre!("invalid address {input}"))
    }
}
