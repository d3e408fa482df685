//! Reclaim primitive types
//!
//! This crate contains the bundle, transaction and execution result types shared by the
//! executor and the CLI, together with constants and helper functions.

pub mod bundle;
pub mod chain;
pub mod constants;
pub mod executor;
pub mod result;
mod transaction;
pub mod utils;
mod wallet;

pub use bundle::{Bundle, BundleFormat, BundleInput, BundleShape, BundleSummary};
pub use executor::OnRevert;
pub use result::{ExecutionResult, SkippedTransaction, TxOutcome, TxStatus};
pub use transaction::{FeeParams, RawTransaction, Transaction, TxKind, ValidationError};
pub use wallet::Wallet;
