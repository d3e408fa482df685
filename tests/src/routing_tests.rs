use crate::common::{bundle_file, call, config, setup, PASSWORD, WALLET};
use ethers::types::{Address, U256};
use reclaim_executor::{
    test_utils::{MockChainClient, MockSafeAdapter, MockUi},
    BundleNormalizer, ExecutionOutcome, ExecutorConfig, NormalizationError,
};
use reclaim_primitives::{BundleShape, TxStatus};
use serde_json::json;
use std::str::FromStr;

const SAFE: &str = "0xaAaAaAaaAaAaAaaAaAAAAAAAAaaaAaAaAaaAaaAa";

#[test]
fn every_shape_keeps_order_and_count() -> eyre::Result<()> {
    let txs: Vec<_> = (1..=3).map(call).collect();
    let cases = [
        (json!({"bundleData": {"transactions": txs}}), BundleShape::Canonical),
        (json!({"format": "eoa", "transactions": txs}), BundleShape::LegacyEoa),
        (json!({"transactions": txs}), BundleShape::RawArray),
        (
            json!({"summary": {"format": "safe_cli"}, "bundleData": {"payloads": txs}}),
            BundleShape::Convertible,
        ),
    ];

    for (value, shape) in cases {
        let (_dir, bundle) = bundle_file(&value)?;
        let normalized = BundleNormalizer::normalize_for_proposal(&bundle)?;
        assert_eq!(normalized.meta.shape, shape);
        let to: Vec<_> = normalized.transactions.iter().map(|t| t.to.clone()).collect();
        assert_eq!(
            to,
            (1..=3).map(|n| Some(format!("0x{n:040x}"))).collect::<Vec<_>>(),
            "{shape}"
        );
    }

    Ok(())
}

#[test]
fn canonical_bundle_normalizes_to_itself() -> eyre::Result<()> {
    let value = json!({"bundleData": {"transactions": [call(1), call(2)]}});
    let (_dir, bundle) = bundle_file(&value)?;
    let once = BundleNormalizer::normalize_for_proposal(&bundle)?;

    let (_dir, again) = bundle_file(&json!({
        "bundleData": {"transactions": serde_json::to_value(&once.transactions)?}
    }))?;
    let twice = BundleNormalizer::normalize_for_proposal(&again)?;

    assert_eq!(once, twice);
    Ok(())
}

#[tokio::test]
async fn unsupported_bundle_is_an_error() -> eyre::Result<()> {
    let s = setup(
        MockChainClient::new(),
        MockUi::new(),
        MockSafeAdapter::with_safes(vec![]),
        config(),
    );
    let (_dir, bundle) = bundle_file(&json!({"calls": [call(1)]}))?;

    let err = s.router.route(&bundle, WALLET).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<NormalizationError>(),
        Some(NormalizationError::UnsupportedFormat { .. })
    ));
    assert_eq!(s.chain.attempts(), 0);
    assert!(s.ui.prompts().is_empty());

    Ok(())
}

#[tokio::test]
async fn rejected_proposal_points_to_bundle_file() -> eyre::Result<()> {
    let safe = Address::from_str(SAFE)?;
    let s = setup(
        MockChainClient::new(),
        MockUi::new().input(PASSWORD).select(SAFE).confirm_with(true),
        MockSafeAdapter::with_safes(vec![safe]).rejecting("nonce already used"),
        config(),
    );
    let (dir, bundle) = bundle_file(&json!({
        "summary": {"format": "safe_ui", "vaultCount": 2},
        "bundleData": {"transactions": [call(1), call(2)]},
    }))?;

    let outcome = s.router.route(&bundle, WALLET).await?;
    let ExecutionOutcome::ProposalFailed { message, output_file } = outcome else {
        panic!("not failed: {outcome}")
    };
    assert!(message.contains("nonce already used"));
    assert_eq!(output_file, Some(dir.path().join("bundle.json")));

    let proposals = s.safe.proposals();
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].safe_address, safe);
    assert_eq!(proposals[0].transactions.len(), 2);
    assert_eq!(proposals[0].summary.vault_count, Some(2));
    assert_eq!(s.chain.attempts(), 0);

    Ok(())
}

#[tokio::test]
async fn forced_direct_converts_safe_payloads() -> eyre::Result<()> {
    let s = setup(
        MockChainClient::new(),
        MockUi::new().confirm_with(true).input(PASSWORD),
        MockSafeAdapter::with_safes(vec![]),
        ExecutorConfig { force_direct: true, ..config() },
    );
    let (_dir, bundle) = bundle_file(&json!({
        "summary": {"format": "safe_cli"},
        "payloads": [call(1), call(2), {"to": format!("0x{:040x}", 3)}],
    }))?;

    let outcome = s.router.route(&bundle, WALLET).await?;
    let ExecutionOutcome::Executed(result) = outcome else { panic!("not executed: {outcome}") };
    assert_eq!((result.attempted, result.succeeded), (2, 2));
    assert_eq!(result.skipped.len(), 1);

    // only complete payloads are estimated, their limits are kept as they are
    assert_eq!(s.estimator.requested(), 2);
    let submitted = s.chain.submitted();
    assert_eq!(submitted.len(), 2);
    assert!(submitted.iter().all(|tx| tx.gas() == Some(&U256::from(100_000))));
    assert!(s.chain.estimated().is_empty());
    assert!(s.safe.proposals().is_empty());

    Ok(())
}

#[tokio::test]
async fn confirmed_atomic_batch_goes_through_multisend() -> eyre::Result<()> {
    let mut config = config();
    config.batch.atomic = true;
    let multisend = config.batch.multisend;
    let s = setup(
        MockChainClient::new(),
        MockUi::new().input(PASSWORD).confirm_with(true),
        MockSafeAdapter::with_safes(vec![]),
        config,
    );
    let (_dir, bundle) = bundle_file(&json!({
        "bundleData": {"transactions": (1..=3).map(call).collect::<Vec<_>>()}
    }))?;

    let outcome = s.router.route(&bundle, WALLET).await?;
    let ExecutionOutcome::Executed(result) = outcome else { panic!("not executed: {outcome}") };
    assert_eq!((result.attempted, result.succeeded), (3, 3));

    let submitted = s.chain.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].to_addr(), Some(&multisend));

    // every call shares the batch transaction
    let hashes: Vec<_> = result.outcomes.iter().map(|o| o.hash()).collect();
    assert!(hashes.iter().all(|h| h.is_some() && *h == hashes[0]));
    assert!(result.outcomes.iter().all(|o| matches!(o.status, TxStatus::Confirmed { .. })));

    Ok(())
}

#[tokio::test]
async fn loosely_typed_summary_still_routes_to_safe() -> eyre::Result<()> {
    let safe = Address::from_str(SAFE)?;
    let s = setup(
        MockChainClient::new(),
        MockUi::new().input(PASSWORD).select(SAFE).confirm_with(true),
        MockSafeAdapter::with_safes(vec![safe]),
        config(),
    );
    let (_dir, bundle) = bundle_file(&json!({
        "summary": {
            "format": "safe_ui",
            "vaults": [format!("0x{:040x}", 17)],
            "rewards": {"token": "AERO"},
        },
        "bundleData": {"transactions": [call(1), call(2)]},
    }))?;

    let outcome = s.router.route(&bundle, WALLET).await?;
    assert!(matches!(outcome, ExecutionOutcome::Proposed { .. }), "{outcome}");
    assert_eq!(s.safe.proposals().len(), 1);
    assert_eq!(s.safe.proposals()[0].summary.vault_count, Some(1));
    assert_eq!(s.chain.attempts(), 0);

    Ok(())
}
