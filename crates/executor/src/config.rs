//! Execution policies and configuration
use ethers::types::{Address, U256};
use reclaim_primitives::{
    constants::{execution, gas, multisend},
    OnRevert,
};
use std::{str::FromStr, time::Duration};

/// Gas limit policy: estimation buffer and the limit used when estimation fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasPolicy {
    multiplier_perc: u64,
    default_limit: U256,
}

impl GasPolicy {
    /// Creates a policy. Buffers below the minimum are raised to the minimum.
    pub fn new(multiplier_perc: u64, default_limit: u64) -> Self {
        Self {
            multiplier_perc: multiplier_perc.max(gas::MIN_MULTIPLIER_PERC),
            default_limit: U256::from(default_limit),
        }
    }

    /// Policy of the primary sending path
    pub fn primary() -> Self {
        Self::new(gas::PRIMARY_MULTIPLIER_PERC, gas::PRIMARY_DEFAULT_LIMIT)
    }

    /// Policy of the fallback path (individual sends after a reverted batch)
    pub fn fallback() -> Self {
        Self::new(gas::FALLBACK_MULTIPLIER_PERC, gas::FALLBACK_DEFAULT_LIMIT)
    }

    pub fn multiplier_perc(&self) -> u64 {
        self.multiplier_perc
    }

    pub fn default_limit(&self) -> U256 {
        self.default_limit
    }

    /// Applies the buffer to an estimate, rounding up
    pub fn apply(&self, estimate: U256) -> U256 {
        let scaled = estimate.saturating_mul(U256::from(self.multiplier_perc));
        let (limit, rem) = scaled.div_mod(U256::from(100));
        if rem.is_zero() {
            limit
        } else {
            limit + 1
        }
    }
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self::primary()
    }
}

/// Fee parameters from configuration. Unset values are estimated from the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeConfig {
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub gas_price: Option<U256>,
}

/// Caller-identity policy of the direct-send path.
///
/// An atomic batch routes every call through the multisend contract, which then becomes
/// `msg.sender` of each call. Permission and allowance checks made against the operator's
/// address fail in that case, so batching is off unless explicitly enabled, and even then each
/// batch needs the operator's confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Allow offering atomic batching to the operator
    pub atomic: bool,
    /// MultiSendCallOnly contract used for atomic batches
    pub multisend: Address,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            atomic: false,
            multisend: Address::from_str(multisend::CALL_ONLY_ADDRESS)
                .expect("valid MultiSendCallOnly address"),
        }
    }
}

/// What happens after an atomic batch reverted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub on_revert: OnRevert,
}

/// Full executor configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Gas policy of the primary path
    pub gas: GasPolicy,
    /// Gas policy of the fallback path
    pub fallback_gas: GasPolicy,
    pub fees: FeeConfig,
    pub batch: BatchPolicy,
    pub retry: RetryPolicy,
    /// Delay between two submissions
    pub inter_tx_delay: Duration,
    /// Confirmations awaited per transaction
    pub confirmations: usize,
    /// Send Safe-format bundles from the EOA instead of proposing them
    pub force_direct: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            gas: GasPolicy::primary(),
            fallback_gas: GasPolicy::fallback(),
            fees: FeeConfig::default(),
            batch: BatchPolicy::default(),
            retry: RetryPolicy::default(),
            inter_tx_delay: Duration::from_millis(execution::INTER_TX_DELAY_MS),
            confirmations: execution::CONFIRMATIONS,
            force_direct: false,
        }
    }
}
