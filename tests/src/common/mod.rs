use reclaim_executor::{
    test_utils::{MockChainClient, MockEstimator, MockSafeAdapter, MockUi, MockWalletService},
    ExecutionRouter, ExecutorConfig,
};
use reclaim_primitives::Bundle;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tempfile::TempDir;

pub const WALLET: &str = "operator";
pub const PASSWORD: &str = "hunter2";

pub struct Setup {
    pub chain: Arc<MockChainClient>,
    pub ui: MockUi,
    pub safe: MockSafeAdapter,
    pub estimator: MockEstimator,
    pub router: ExecutionRouter<MockChainClient>,
}

/// Default configuration without the delay between transactions
pub fn config() -> ExecutorConfig {
    ExecutorConfig { inter_tx_delay: Duration::ZERO, ..Default::default() }
}

pub fn setup(
    chain: MockChainClient,
    ui: MockUi,
    safe: MockSafeAdapter,
    config: ExecutorConfig,
) -> Setup {
    let chain = Arc::new(chain);
    let estimator = MockEstimator::default();
    let router = ExecutionRouter::new(
        chain.clone(),
        Arc::new(MockWalletService::new(WALLET, PASSWORD)),
        Arc::new(ui.clone()),
        Arc::new(safe.clone()),
        Arc::new(estimator.clone()),
        config,
    );

    Setup { chain, ui, safe, estimator, router }
}

/// Writes the bundle to a temporary file and loads it back
pub fn bundle_file(value: &Value) -> eyre::Result<(TempDir, Bundle)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bundle.json");
    std::fs::write(&path, serde_json::to_vec_pretty(value)?)?;
    let bundle = Bundle::from_file(&path)?;
    Ok((dir, bundle))
}

/// A valid call to the address `n`
pub fn call(n: u64) -> Value {
    json!({"to": format!("0x{n:040x}"), "data": "0x1234", "value": "0x0"})
}
