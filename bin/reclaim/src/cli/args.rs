use crate::utils::{parse_address, parse_duration, parse_on_revert, parse_u256};
use clap::Parser;
use ethers::types::{Address, U256};
use expanded_pathbuf::ExpandedPathBuf;
use reclaim_executor::{BatchPolicy, ExecutorConfig, FeeConfig, GasPolicy, RetryPolicy};
use reclaim_primitives::{
    constants::{execution, gas, multisend, safe},
    OnRevert,
};
use std::{path::PathBuf, time::Duration};

/// Execution client CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct ChainArgs {
    /// Ethereum execution client RPC endpoint.
    #[clap(long, default_value = "http://127.0.0.1:8545")]
    pub eth_client_address: String,

    /// Poll interval of the execution client (in milliseconds).
    #[clap(long, default_value = "500", value_parser=parse_duration)]
    pub poll_interval: Duration,
}

/// Keystore CLI args
#[derive(Debug, Clone, Parser)]
pub struct KeystoreArgs {
    /// Name of the key in the keystore directory.
    #[clap(long)]
    pub wallet: String,

    /// Keystore directory.
    ///
    /// By default, `~/.reclaim/keystore` is used.
    #[clap(long)]
    pub keystore_dir: Option<ExpandedPathBuf>,
}

/// Direct sending CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct ExecutorArgs {
    /// Max fee per gas (in wei). Estimated from the chain if not set.
    #[clap(long, value_parser=parse_u256)]
    pub max_fee_per_gas: Option<U256>,

    /// Max priority fee per gas (in wei). Estimated from the chain if not set.
    #[clap(long, value_parser=parse_u256)]
    pub max_priority_fee_per_gas: Option<U256>,

    /// Gas estimation buffer (in percent). Values below 130 are raised to 130.
    #[clap(long, default_value_t = gas::PRIMARY_MULTIPLIER_PERC)]
    pub gas_multiplier: u64,

    /// Gas limit used when estimation fails.
    #[clap(long, default_value_t = gas::PRIMARY_DEFAULT_LIMIT)]
    pub default_gas_limit: u64,

    /// Delay between two transactions (in milliseconds).
    #[clap(long, default_value = "2000", value_parser=parse_duration)]
    pub tx_delay: Duration,

    /// Offer to send several transactions as one atomic batch through the multisend contract.
    ///
    /// The multisend contract becomes `msg.sender` of every call.
    #[clap(long)]
    pub atomic_batch: bool,

    /// What to do when an atomic batch reverts: `ask`, `always` or `never` fall back to sending
    /// the transactions one by one.
    #[clap(long, default_value = "ask", value_parser=parse_on_revert)]
    pub on_revert: OnRevert,

    /// MultiSendCallOnly contract address.
    #[clap(long, default_value = multisend::CALL_ONLY_ADDRESS, value_parser=parse_address)]
    pub multisend_address: Address,

    /// Send Safe-format bundles from the wallet instead of proposing them.
    #[clap(long)]
    pub force_direct: bool,
}

impl ExecutorArgs {
    /// Executor configuration from the args
    pub fn to_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            gas: GasPolicy::new(self.gas_multiplier, self.default_gas_limit),
            fallback_gas: GasPolicy::fallback(),
            fees: FeeConfig {
                max_fee_per_gas: self.max_fee_per_gas,
                max_priority_fee_per_gas: self.max_priority_fee_per_gas,
                gas_price: None,
            },
            batch: BatchPolicy { atomic: self.atomic_batch, multisend: self.multisend_address },
            retry: RetryPolicy { on_revert: self.on_revert },
            inter_tx_delay: self.tx_delay,
            confirmations: execution::CONFIRMATIONS,
            force_direct: self.force_direct,
        }
    }
}

/// Safe transaction service CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct SafeArgs {
    /// Safe transaction service URL. Defaults to the public service of the connected chain.
    #[clap(long)]
    pub safe_service_url: Option<String>,

    /// Safe web application URL used for review links.
    #[clap(long, default_value = safe::APP_URL)]
    pub safe_app_url: String,
}

/// Execute bundle CLI args
#[derive(Debug, Clone, Parser)]
pub struct ExecuteArgs {
    /// Path to the bundle file.
    #[clap(long)]
    pub bundle: PathBuf,

    /// Keystore args
    #[clap(flatten)]
    pub keystore: KeystoreArgs,

    /// Execution client args
    #[clap(flatten)]
    pub chain: ChainArgs,

    /// Direct sending args
    #[clap(flatten)]
    pub executor: ExecutorArgs,

    /// Safe transaction service args
    #[clap(flatten)]
    pub safe: SafeArgs,
}

/// Create wallet CLI args
#[derive(Debug, Clone, Parser)]
pub struct CreateWalletArgs {
    /// Name of the key.
    #[clap(long)]
    pub name: String,

    /// Keystore directory.
    ///
    /// By default, `~/.reclaim/keystore` is used.
    #[clap(long)]
    pub keystore_dir: Option<ExpandedPathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn executor_args_defaults() {
        let args = ExecutorArgs::try_parse_from(vec!["executorargs"]).unwrap();
        assert_eq!(
            args,
            ExecutorArgs {
                max_fee_per_gas: None,
                max_priority_fee_per_gas: None,
                gas_multiplier: 150,
                default_gas_limit: 5_000_000,
                tx_delay: Duration::from_secs(2),
                atomic_batch: false,
                on_revert: OnRevert::AskOperator,
                multisend_address: Address::from_str(multisend::CALL_ONLY_ADDRESS).unwrap(),
                force_direct: false,
            }
        );
        assert_eq!(args.to_config(), ExecutorConfig::default());
    }

    #[test]
    fn executor_args() {
        let args = vec![
            "executorargs",
            "--max-fee-per-gas",
            "30000000000",
            "--max-priority-fee-per-gas",
            "1000000000",
            "--gas-multiplier",
            "110",
            "--default-gas-limit",
            "1000000",
            "--tx-delay",
            "0",
            "--atomic-batch",
            "--on-revert",
            "always",
            "--force-direct",
        ];
        let config = ExecutorArgs::try_parse_from(args).unwrap().to_config();

        assert_eq!(config.fees.max_fee_per_gas, Some(U256::from(30_000_000_000u64)));
        assert_eq!(config.fees.max_priority_fee_per_gas, Some(U256::from(1_000_000_000u64)));
        // raised to the minimum buffer
        assert_eq!(config.gas.multiplier_perc(), 130);
        assert_eq!(config.gas.default_limit(), U256::from(1_000_000));
        assert_eq!(config.inter_tx_delay, Duration::ZERO);
        assert!(config.batch.atomic);
        assert_eq!(config.retry.on_revert, OnRevert::AlwaysFallback);
        assert!(config.force_direct);
    }

    #[test]
    fn invalid_executor_args() {
        assert!(ExecutorArgs::try_parse_from(vec!["executorargs", "--on-revert", "maybe"]).is_err());
        assert!(ExecutorArgs::try_parse_from(vec!["executorargs", "--max-fee-per-gas", "0x10"])
            .is_err());
        assert!(
            ExecutorArgs::try_parse_from(vec!["executorargs", "--multisend-address", "0x1"]).is_err()
        );
    }

    #[test]
    fn chain_and_safe_args() {
        assert_eq!(
            ChainArgs {
                eth_client_address: "http://127.0.0.1:8545".into(),
                poll_interval: Duration::from_millis(500),
            },
            ChainArgs::try_parse_from(vec!["chainargs"]).unwrap()
        );
        assert_eq!(
            SafeArgs {
                safe_service_url: Some("http://localhost:8000".into()),
                safe_app_url: "https://app.safe.global".into(),
            },
            SafeArgs::try_parse_from(vec![
                "safeargs",
                "--safe-service-url",
                "http://localhost:8000"
            ])
            .unwrap()
        );
    }

    #[test]
    fn execute_args() {
        let args = ExecuteArgs::try_parse_from(vec![
            "executeargs",
            "--bundle",
            "bundle.json",
            "--wallet",
            "operator",
            "--eth-client-address",
            "ws://127.0.0.1:8546",
        ])
        .unwrap();
        assert_eq!(args.bundle, PathBuf::from("bundle.json"));
        assert_eq!(args.keystore.wallet, "operator");
        assert!(args.keystore.keystore_dir.is_none());
        assert_eq!(args.chain.eth_client_address, "ws://127.0.0.1:8546");

        assert!(ExecuteArgs::try_parse_from(vec!["executeargs", "--wallet", "operator"]).is_err());
    }
}
