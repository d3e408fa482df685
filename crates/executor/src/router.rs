use crate::{
    batcher::TransactionBatcher,
    client::ChainClient,
    collaborators::{ConversionContext, PayloadEstimator, SafeAdapter, UiHandler, WalletService},
    config::ExecutorConfig,
    multisig::{MultisigProposalFlow, ProposalState},
    normalizer::BundleNormalizer,
    signer::acquire_signer,
};
use reclaim_primitives::{utils::parse_checksummed_address, Bundle, ExecutionResult};
use serde::Serialize;
use std::{fmt, path::PathBuf, sync::Arc};
use tracing::{info, warn};

/// Result of routing one bundle
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ExecutionOutcome {
    /// Sent from the operator's address
    Executed(ExecutionResult),
    /// Proposed to a Safe, awaiting the other owners
    Proposed { safe_tx_hash: String, url: String },
    /// Declined by the operator
    Cancelled,
    /// The Safe service refused the proposal
    ProposalFailed { message: String, output_file: Option<PathBuf> },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Executed(result) => result.success,
            Self::Proposed { .. } => true,
            Self::Cancelled | Self::ProposalFailed { .. } => false,
        }
    }
}

impl From<ProposalState> for ExecutionOutcome {
    fn from(state: ProposalState) -> Self {
        match state {
            ProposalState::Proposed(receipt) => Self::Proposed {
                safe_tx_hash: receipt.safe_tx_hash,
                url: receipt.transaction_url,
            },
            ProposalState::Failed { message, output_file } => {
                Self::ProposalFailed { message, output_file }
            }
            _ => Self::Cancelled,
        }
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed(result) => write!(f, "{result}"),
            Self::Proposed { safe_tx_hash, url } => {
                write!(f, "proposed Safe transaction {safe_tx_hash}, review it at {url}")
            }
            Self::Cancelled => write!(f, "cancelled"),
            Self::ProposalFailed { message, output_file: Some(path) } => {
                write!(f, "proposal failed: {message}, upload {} manually", path.display())
            }
            Self::ProposalFailed { message, output_file: None } => {
                write!(f, "proposal failed: {message}")
            }
        }
    }
}

/// Sends bundles down the direct or the multisig path according to their declared format
pub struct ExecutionRouter<C>
where
    C: ChainClient,
{
    chain: Arc<C>,
    wallets: Arc<dyn WalletService>,
    ui: Arc<dyn UiHandler>,
    normalizer: BundleNormalizer,
    multisig: MultisigProposalFlow,
    batcher: TransactionBatcher<C>,
    config: ExecutorConfig,
}

impl<C> ExecutionRouter<C>
where
    C: ChainClient,
{
    pub fn new(
        chain: Arc<C>,
        wallets: Arc<dyn WalletService>,
        ui: Arc<dyn UiHandler>,
        safe: Arc<dyn SafeAdapter>,
        estimator: Arc<dyn PayloadEstimator>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            normalizer: BundleNormalizer::new(estimator),
            multisig: MultisigProposalFlow::new(wallets.clone(), ui.clone(), safe),
            batcher: TransactionBatcher::new(chain.clone(), ui.clone(), &config),
            chain,
            wallets,
            ui,
            config,
        }
    }

    /// Executes or proposes a bundle.
    ///
    /// Bundles declared as `safe_ui` or `safe_cli` are proposed to a Safe unless direct
    /// sending is forced. Everything else is sent from the operator's address.
    ///
    /// # Arguments
    /// * `bundle` - The [Bundle](Bundle)
    /// * `wallet_name` - Name of the operator's key
    ///
    /// # Returns
    /// * `ExecutionOutcome` - What happened to the bundle
    pub async fn route(&self, bundle: &Bundle, wallet_name: &str) -> eyre::Result<ExecutionOutcome> {
        info!("Routing {bundle}");

        if bundle.is_multisig() && !self.config.force_direct {
            info!("Bundle is declared for a Safe, proposing it");
            let state = self.multisig.run(bundle, wallet_name).await?;
            return Ok(state.into());
        }

        // structural errors fail before the operator is asked anything
        BundleNormalizer::normalize_for_proposal(bundle)?;

        if bundle.is_multisig() {
            let prompt = format!(
                "{bundle} is declared for a Safe. Send its transactions from your own address instead?"
            );
            if !self.ui.confirm(&prompt).await? {
                info!("Direct sending of a Safe bundle declined");
                return Ok(ExecutionOutcome::Cancelled);
            }
        } else if !bundle.safe_hints.is_empty() {
            warn!(
                "Bundle is not declared for a Safe but contains {}, sending it directly",
                bundle.safe_hints.join(", ")
            );
        }

        let result = self.execute_direct(bundle, wallet_name).await?;
        info!("Execution finished: {result}");

        Ok(ExecutionOutcome::Executed(result))
    }

    async fn execute_direct(&self, bundle: &Bundle, wallet_name: &str) -> eyre::Result<ExecutionResult> {
        let signer = acquire_signer(self.wallets.as_ref(), self.ui.as_ref(), wallet_name).await?;
        let chain_id = self.chain.chain_id().await?;

        let ctx = ConversionContext {
            from: signer.address(),
            chain_id,
            max_fee_per_gas: self.config.fees.max_fee_per_gas,
            max_priority_fee_per_gas: self.config.fees.max_priority_fee_per_gas,
        };
        let normalized = self.normalizer.normalize(bundle, &ctx).await?;

        if let Some(from) = normalized.meta.from.as_deref() {
            if parse_checksummed_address(from) != Some(signer.address()) {
                warn!("Bundle was prepared for {from}, sending it from {:?}", signer.address());
            }
        }

        self.batcher.batch(&normalized.transactions, &signer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NormalizationError;
    use crate::test_utils::{
        MockChainClient, MockEstimator, MockSafeAdapter, MockUi, MockWalletService,
    };
    use serde_json::json;
    use std::time::Duration;

    struct Harness {
        chain: Arc<MockChainClient>,
        ui: MockUi,
        safe: MockSafeAdapter,
        router: ExecutionRouter<MockChainClient>,
    }

    fn harness(ui: MockUi, safe: MockSafeAdapter, force_direct: bool) -> Harness {
        let chain = Arc::new(MockChainClient::new());
        let config = ExecutorConfig {
            inter_tx_delay: Duration::ZERO,
            force_direct,
            ..Default::default()
        };
        let router = ExecutionRouter::new(
            chain.clone(),
            Arc::new(MockWalletService::new("operator", "hunter2")),
            Arc::new(ui.clone()),
            Arc::new(safe.clone()),
            Arc::new(MockEstimator::default()),
            config,
        );
        Harness { chain, ui, safe, router }
    }

    fn safe_bundle() -> Bundle {
        Bundle::from_value(&json!({
            "summary": {"format": "safe_ui"},
            "bundleData": {"transactions": [
                {"to": "0x1111111111111111111111111111111111111111", "data": "0x01"},
            ]},
        }))
    }

    #[tokio::test]
    async fn eoa_bundles_are_sent_directly() {
        let h = harness(MockUi::new().input("hunter2"), MockSafeAdapter::with_safes(vec![]), false);
        let bundle = Bundle::from_value(&json!({"bundleData": {"transactions": [
            {"to": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "data": "0x1234", "value": "0x0"},
        ]}}));

        let outcome = h.router.route(&bundle, "operator").await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(h.chain.submitted().len(), 1);
        assert!(h.safe.proposals().is_empty());
    }

    #[tokio::test]
    async fn safe_bundles_are_proposed() {
        let safe_address = "0xaAaAaAaaAaAaAaaAaAAAAAAAAaaaAaAaAaaAaaAa";
        let h = harness(
            MockUi::new().input("hunter2").select(safe_address).confirm_with(true),
            MockSafeAdapter::with_safes(vec![safe_address.parse().unwrap()]),
            false,
        );

        let outcome = h.router.route(&safe_bundle(), "operator").await.unwrap();
        assert_eq!(
            outcome,
            ExecutionOutcome::Proposed {
                safe_tx_hash: "0x1234".into(),
                url: "https://app.safe.global/transactions/tx?id=0x1234".into()
            }
        );
        assert!(outcome.is_success());
        assert_eq!(h.chain.attempts(), 0);
    }

    #[tokio::test]
    async fn forced_direct_safe_bundle_needs_confirmation() {
        let h = harness(MockUi::new().confirm_with(false), MockSafeAdapter::with_safes(vec![]), true);
        let outcome = h.router.route(&safe_bundle(), "operator").await.unwrap();
        assert_eq!(outcome, ExecutionOutcome::Cancelled);
        assert!(!outcome.is_success());
        assert_eq!(h.chain.attempts(), 0);

        let h = harness(
            MockUi::new().confirm_with(true).input("hunter2"),
            MockSafeAdapter::with_safes(vec![]),
            true,
        );
        let outcome = h.router.route(&safe_bundle(), "operator").await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(h.chain.submitted().len(), 1);
        assert!(h.safe.proposals().is_empty());
        assert_eq!(h.ui.confirmations_asked(), 1);
    }

    #[tokio::test]
    async fn unsupported_bundle_is_an_error() {
        let h = harness(MockUi::new(), MockSafeAdapter::with_safes(vec![]), false);
        let err = h
            .router
            .route(&Bundle::from_value(&json!({"vaults": []})), "operator")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported bundle format"));
        assert_eq!(h.chain.attempts(), 0);
        // no password prompt for a bundle that cannot be sent
        assert!(h.ui.prompts().is_empty());
    }

    #[tokio::test]
    async fn malformed_forced_direct_bundle_fails_before_confirmation() {
        let h = harness(MockUi::new(), MockSafeAdapter::with_safes(vec![]), true);
        let bundle = Bundle::from_value(&json!({
            "summary": {"format": "safe_cli"},
            "bundleData": {"transactions": "0x1234"},
        }));

        let err = h.router.route(&bundle, "operator").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NormalizationError>(),
            Some(NormalizationError::MissingTransactions { .. })
        ));
        assert!(h.ui.prompts().is_empty());
    }
}
