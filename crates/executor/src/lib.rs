//! Executor is a crate for normalizing claim bundles and sending them from an EOA or proposing
//! them to a Safe
mod aggregator;
mod batcher;
mod client;
mod collaborators;
mod config;
mod errors;
mod ethereum;
mod multisend;
mod multisig;
mod normalizer;
mod router;
mod safe;
mod sequential;
mod signer;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregator::ResultAggregator;
pub use batcher::{validate_transactions, TransactionBatcher};
pub use client::ChainClient;
pub use collaborators::{
    ConversionContext, InputValidator, MultisigProposal, PayloadEstimator, ProposalReceipt,
    SafeAdapter, UiHandler, WalletService,
};
pub use config::{BatchPolicy, ExecutorConfig, FeeConfig, GasPolicy, RetryPolicy};
pub use errors::{ExecutionError, NormalizationError};
pub use ethereum::EthereumClient;
pub use multisend::{build_batch, encode_packed, multisend_calldata};
pub use multisig::{MultisigProposalFlow, ProposalState, MANUAL_ENTRY};
pub use normalizer::{BundleMeta, BundleNormalizer, NormalizedBundle};
pub use router::{ExecutionOutcome, ExecutionRouter};
pub use safe::{SafeTransactionService, SafeTx};
pub use sequential::{ResolvedFees, SequentialExecutor};
pub use signer::acquire_signer;
