use ethers::types::H256;
use thiserror::Error;

/// Bundle could not be reduced to a transaction sequence
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
    /// No transaction sequence on any known key
    #[error("unsupported bundle format, top-level keys: [{}]", keys.join(", "))]
    UnsupportedFormat { keys: Vec<String> },
    /// A transaction sequence key is present but holds no sequence
    #[error("bundle key {key} does not contain a transaction list")]
    MissingTransactions { key: String },
}

/// Errors raised while sending transactions
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Gas estimation failed (non-fatal, a default limit is used)
    #[error("gas estimation failed: {inner}")]
    Estimation { inner: String },
    /// The transaction could not be submitted
    #[error("submission failed: {inner}")]
    Submission { inner: String },
    /// The transaction was submitted but no receipt could be obtained
    #[error("confirmation of {hash:?} failed: {inner}")]
    Confirmation { hash: H256, inner: String },
    /// The transaction was dropped from the mempool before being mined
    #[error("transaction {hash:?} was dropped")]
    Dropped { hash: H256 },
    /// The atomic batch reverted on-chain
    #[error("atomic batch {hash:?} reverted")]
    Reverted { hash: H256 },
    /// An external collaborator (wallet service, Safe service, ...) failed
    #[error("{collaborator} failed: {inner}")]
    Collaborator { collaborator: &'static str, inner: String },
}
