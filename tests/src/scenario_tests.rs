use crate::common::{bundle_file, call, config, setup, PASSWORD, WALLET};
use ethers::types::{transaction::eip2718::TypedTransaction, Address};
use reclaim_executor::{
    test_utils::{test_wallet, Behaviour, MockChainClient, MockSafeAdapter, MockUi},
    BundleNormalizer, ExecutionOutcome,
};
use reclaim_primitives::{BundleShape, TxStatus};
use serde_json::json;
use std::str::FromStr;

const AAA: &str = "0xaAaAaAaaAaAaAaaAaAAAAAAAAaaaAaAaAaaAaaAa";
const BBB: &str = "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB";

#[tokio::test]
async fn single_canonical_transaction_is_sent_directly() -> eyre::Result<()> {
    let s = setup(
        MockChainClient::new(),
        MockUi::new().input(PASSWORD),
        MockSafeAdapter::with_safes(vec![]),
        config(),
    );
    let (_dir, bundle) = bundle_file(&json!({
        "bundleData": {"transactions": [{"to": AAA, "data": "0x1234", "value": "0x0"}]}
    }))?;

    let outcome = s.router.route(&bundle, WALLET).await?;
    let ExecutionOutcome::Executed(result) = outcome else { panic!("not executed: {outcome}") };
    assert_eq!((result.attempted, result.succeeded), (1, 1));
    assert!(result.success);

    // no batching decision for a single transaction
    assert_eq!(s.ui.confirmations_asked(), 0);
    let submitted = s.chain.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].to_addr(), Some(&Address::from_str(AAA)?));
    assert_eq!(submitted[0].from(), Some(&test_wallet().address()));

    Ok(())
}

#[tokio::test]
async fn legacy_eoa_bundle_carries_sender() -> eyre::Result<()> {
    let value = json!({
        "format": "eoa",
        "transactions": [{"to": AAA, "data": "0xabcd"}],
        "fromAddress": BBB,
    });
    let (_dir, bundle) = bundle_file(&value)?;

    let normalized = BundleNormalizer::normalize_for_proposal(&bundle)?;
    assert_eq!(normalized.meta.shape, BundleShape::LegacyEoa);
    assert_eq!(normalized.meta.from.as_deref(), Some(BBB));
    assert_eq!(normalized.transactions.len(), 1);

    let s = setup(
        MockChainClient::new(),
        MockUi::new().input(PASSWORD),
        MockSafeAdapter::with_safes(vec![]),
        config(),
    );
    let outcome = s.router.route(&bundle, WALLET).await?;
    let ExecutionOutcome::Executed(result) = outcome else { panic!("not executed: {outcome}") };
    assert_eq!((result.attempted, result.succeeded), (1, 1));
    assert_eq!(s.ui.confirmations_asked(), 0);
    assert_eq!(s.chain.submitted().len(), 1);

    Ok(())
}

#[tokio::test]
async fn declined_proposal_without_known_safes() -> eyre::Result<()> {
    let s = setup(
        MockChainClient::new(),
        MockUi::new().input(PASSWORD).input(AAA).confirm_with(false),
        MockSafeAdapter::with_safes(vec![]),
        config(),
    );
    let (_dir, bundle) = bundle_file(&json!({
        "summary": {"format": "safe_ui"},
        "bundleData": {"transactions": [call(1), call(2)]},
    }))?;

    let outcome = s.router.route(&bundle, WALLET).await?;
    assert_eq!(outcome, ExecutionOutcome::Cancelled);
    assert!(!outcome.is_success());

    // manual entry was the only way to pick the Safe
    let prompts = s.ui.prompts();
    assert!(prompts.iter().any(|p| p.starts_with("input: Safe address")));
    assert!(prompts.iter().all(|p| !p.starts_with("select: ")));

    assert!(s.safe.proposals().is_empty());
    assert_eq!(s.chain.attempts(), 0);

    Ok(())
}

#[tokio::test]
async fn failed_submission_is_recorded_and_run_continues() -> eyre::Result<()> {
    let s = setup(
        MockChainClient::new().script([
            Behaviour::Succeed,
            Behaviour::Succeed,
            Behaviour::FailSubmission,
            Behaviour::Succeed,
            Behaviour::Succeed,
        ]),
        MockUi::new().input(PASSWORD),
        MockSafeAdapter::with_safes(vec![]),
        config(),
    );
    let (_dir, bundle) = bundle_file(&json!({
        "bundleData": {"transactions": (1..=5).map(call).collect::<Vec<_>>()}
    }))?;

    let outcome = s.router.route(&bundle, WALLET).await?;
    let ExecutionOutcome::Executed(result) = outcome else { panic!("not executed: {outcome}") };
    assert_eq!((result.attempted, result.succeeded), (5, 4));
    assert!(result.success);

    let third = result.outcome(2).expect("third transaction recorded");
    assert!(matches!(third.status, TxStatus::Failed { hash: None, .. }));
    assert!(third.error().unwrap_or_default().contains("nonce too low"));
    assert_eq!(s.chain.attempts(), 5);
    assert_eq!(s.chain.submitted().len(), 4);

    Ok(())
}

#[tokio::test]
async fn transaction_without_data_is_skipped() -> eyre::Result<()> {
    let s = setup(
        MockChainClient::new(),
        MockUi::new().input(PASSWORD),
        MockSafeAdapter::with_safes(vec![]),
        config(),
    );
    let (_dir, bundle) = bundle_file(&json!({
        "bundleData": {"transactions": [call(1), {"to": format!("0x{:040x}", 2)}, call(3)]}
    }))?;

    let outcome = s.router.route(&bundle, WALLET).await?;
    let ExecutionOutcome::Executed(result) = outcome else { panic!("not executed: {outcome}") };
    assert_eq!((result.attempted, result.succeeded), (2, 2));
    assert!(result.success);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].index, 1);
    assert!(result.skipped[0].reason.contains("data"));

    let submitted = s.chain.submitted();
    assert_eq!(submitted.len(), 2);
    assert!(submitted.iter().all(|tx| matches!(tx, TypedTransaction::Eip1559(_))));

    Ok(())
}
