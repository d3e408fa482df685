//! Per-transaction and per-run execution results

use crate::utils::as_checksum_addr;
use ethers::types::{Address, H256, U256, U64};
use serde::Serialize;
use std::fmt;

/// What happened to one submitted transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TxStatus {
    /// Mined with status 1
    Confirmed { hash: H256, block: Option<U64>, gas_used: Option<U256> },
    /// Mined with status 0
    Reverted { hash: H256, block: Option<U64>, gas_used: Option<U256> },
    /// Submission or confirmation failed
    Failed { hash: Option<H256>, error: String },
}

impl TxStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Outcome of one submitted transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutcome {
    /// Position of the transaction in the bundle
    pub index: usize,
    #[serde(serialize_with = "as_checksum_addr")]
    pub to: Address,
    #[serde(flatten)]
    pub status: TxStatus,
}

impl TxOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn hash(&self) -> Option<H256> {
        match &self.status {
            TxStatus::Confirmed { hash, .. } | TxStatus::Reverted { hash, .. } => Some(*hash),
            TxStatus::Failed { hash, .. } => *hash,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            TxStatus::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// A transaction excluded by validation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedTransaction {
    pub index: usize,
    pub reason: String,
}

/// Result of executing a bundle
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Number of transactions submitted (or attempted)
    pub attempted: usize,
    /// Number of transactions confirmed with status 1
    pub succeeded: usize,
    /// True iff at least one transaction succeeded
    pub success: bool,
    pub outcomes: Vec<TxOutcome>,
    pub skipped: Vec<SkippedTransaction>,
}

impl ExecutionResult {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    /// Outcomes of the transactions that did not succeed
    pub fn failures(&self) -> impl Iterator<Item = &TxOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Outcome of the transaction at `index` in the bundle
    pub fn outcome(&self, index: usize) -> Option<&TxOutcome> {
        self.outcomes.iter().find(|o| o.index == index)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} transactions succeeded", self.succeeded, self.attempted)?;
        if !self.skipped.is_empty() {
            write!(f, ", {} skipped", self.skipped.len())?;
        }
        Ok(())
    }
}
