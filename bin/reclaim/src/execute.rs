use crate::{
    cli::args::{CreateWalletArgs, ExecuteArgs},
    ui::TerminalUi,
    utils::unwrap_path_or_home,
    wallets::KeystoreWalletService,
};
use alloy_chains::Chain;
use ethers::providers::Middleware;
use reclaim_executor::{
    ChainClient, EthereumClient, ExecutionOutcome, ExecutionRouter, SafeTransactionService,
    UiHandler,
};
use reclaim_primitives::{Bundle, ExecutionResult, TxStatus, Wallet};
use std::sync::Arc;
use tracing::{info, warn};

/// Executes or proposes the bundle of the args
pub async fn execute_bundle<M>(args: ExecuteArgs, provider: Arc<M>) -> eyre::Result<()>
where
    M: Middleware + 'static,
{
    let bundle = Bundle::from_file(&args.bundle)?;
    info!("Loaded {bundle} from {:?}", args.bundle);

    let client = Arc::new(EthereumClient::new(provider, args.chain.poll_interval));
    let chain = Chain::from_id(client.chain_id().await?);
    info!("Connected to chain {chain}");

    let config = args.executor.to_config();
    let keystore_dir = unwrap_path_or_home(args.keystore.keystore_dir)?;
    let safe = SafeTransactionService::new(
        chain,
        args.safe.safe_service_url,
        args.safe.safe_app_url,
        config.batch.multisend,
    )?;

    let router = ExecutionRouter::new(
        client.clone(),
        Arc::new(KeystoreWalletService::new(keystore_dir)),
        Arc::new(TerminalUi::stdio()),
        Arc::new(safe),
        client,
        config,
    );

    let outcome = router.route(&bundle, &args.keystore.wallet).await?;
    report(&outcome);

    match outcome {
        ExecutionOutcome::Cancelled => Ok(()),
        outcome if outcome.is_success() => Ok(()),
        outcome => Err(eyre::eyre!("Bundle was not executed: {outcome}")),
    }
}

fn report(outcome: &ExecutionOutcome) {
    match outcome {
        ExecutionOutcome::Executed(result) => report_result(result),
        ExecutionOutcome::Proposed { .. } | ExecutionOutcome::Cancelled => {
            info!("Bundle {outcome}")
        }
        ExecutionOutcome::ProposalFailed { .. } => warn!("Bundle {outcome}"),
    }
}

fn report_result(result: &ExecutionResult) {
    for outcome in &result.outcomes {
        match &outcome.status {
            TxStatus::Confirmed { hash, block, gas_used } => info!(
                "Transaction {} to {:?}: confirmed {hash:?} (block {block:?}, gas used {gas_used:?})",
                outcome.index, outcome.to
            ),
            TxStatus::Reverted { hash, block, .. } => warn!(
                "Transaction {} to {:?}: reverted {hash:?} (block {block:?})",
                outcome.index, outcome.to
            ),
            TxStatus::Failed { error, .. } => {
                warn!("Transaction {} to {:?}: failed, {error}", outcome.index, outcome.to)
            }
        }
    }
    for skipped in &result.skipped {
        warn!("Transaction {} skipped: {}", skipped.index, skipped.reason);
    }

    info!("{result}");
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(err) => warn!("Could not serialize the execution result: {err}"),
    }
}

/// Creates a new encrypted key in the keystore directory
pub async fn create_wallet(args: CreateWalletArgs) -> eyre::Result<()> {
    let dir = unwrap_path_or_home(args.keystore_dir)?;
    info!("Creating wallet {}... Storing to: {:?}", args.name, dir.to_path_buf());

    let ui = TerminalUi::stdio();
    let password = ui
        .get_user_input(
            "Keystore password",
            &|input: &str| input.len() >= 8,
            "Password must be at least 8 characters long",
        )
        .await?;

    let name = args.name;
    let wallet =
        tokio::task::spawn_blocking(move || Wallet::create_keystore(dir, &name, &password)).await??;
    info!("Wallet signer {:?}", wallet.address());

    Ok(())
}
