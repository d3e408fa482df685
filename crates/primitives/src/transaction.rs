//! Transactions as they appear in bundles and after validation

use crate::utils::{as_checksum_addr, parse_call_data, parse_checksummed_address, parse_quantity};
use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Loosely-typed transaction as produced upstream.
///
/// Quantities may be hex strings, decimal strings or numbers, and every field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, alias = "gas", skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<Value>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Value>,
}

impl RawTransaction {
    /// Parses one element of a transaction sequence. Elements that are not transaction objects
    /// become an empty transaction, which is rejected later by validation.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Transaction kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Single gas price (type 0)
    Legacy,
    /// Fee-market transaction (type 2)
    #[default]
    Eip1559,
}

/// Fee parameters carried by a transaction. Missing values are filled from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParams {
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub gas_price: Option<U256>,
}

/// A validated on-chain call
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Position of the transaction in the bundle
    pub index: usize,
    #[serde(serialize_with = "as_checksum_addr")]
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: Option<U256>,
    pub kind: TxKind,
    pub fees: FeeParams,
}

/// Reasons for excluding a transaction from execution
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("transaction is missing its destination address")]
    MissingTo,
    #[error("transaction is missing its call data")]
    MissingData,
    #[error("{0} is not a valid (checksummed) address")]
    InvalidAddress(String),
    #[error("{0} is not valid hex call data")]
    InvalidData(String),
    #[error("{field} value {value} is not a non-negative integer")]
    InvalidQuantity { field: &'static str, value: String },
}

fn quantity(field: &'static str, val: &Option<Value>) -> Result<Option<U256>, ValidationError> {
    match val {
        None => Ok(None),
        Some(v) => parse_quantity(v)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidQuantity { field, value: v.to_string() }),
    }
}

impl Transaction {
    /// Validates a raw transaction.
    ///
    /// # Arguments
    /// * `index` - Position of the transaction in the bundle
    /// * `raw` - The [RawTransaction](RawTransaction) to validate
    ///
    /// # Returns
    /// * `Transaction` - The validated transaction with a checksum-normalized destination
    pub fn validate(index: usize, raw: &RawTransaction) -> Result<Self, ValidationError> {
        let to = match raw.to.as_deref().map(str::trim) {
            None | Some("") => return Err(ValidationError::MissingTo),
            Some(to) => parse_checksummed_address(to)
                .ok_or_else(|| ValidationError::InvalidAddress(to.to_string()))?,
        };

        let data = match raw.data.as_deref().map(str::trim) {
            None | Some("") => return Err(ValidationError::MissingData),
            Some(data) => {
                parse_call_data(data).ok_or_else(|| ValidationError::InvalidData(data.to_string()))?
            }
        };

        let value = quantity("value", &raw.value)?.unwrap_or_default();
        let gas_limit = quantity("gasLimit", &raw.gas_limit)?.filter(|gas| !gas.is_zero());
        let fees = FeeParams {
            max_fee_per_gas: quantity("maxFeePerGas", &raw.max_fee_per_gas)?,
            max_priority_fee_per_gas: quantity(
                "maxPriorityFeePerGas",
                &raw.max_priority_fee_per_gas,
            )?,
            gas_price: quantity("gasPrice", &raw.gas_price)?,
        };

        let kind = match quantity("type", &raw.tx_type)?.map(|t| t.low_u64()) {
            Some(0) | Some(1) => TxKind::Legacy,
            Some(_) => TxKind::Eip1559,
            None if fees.gas_price.is_some() && fees.max_fee_per_gas.is_none() => TxKind::Legacy,
            None => TxKind::Eip1559,
        };

        Ok(Self { index, to, data, value, gas_limit, kind, fees })
    }
}
