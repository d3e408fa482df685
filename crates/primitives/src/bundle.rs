//! Bundles of calls produced by the upstream claiming workflow

use crate::{transaction::RawTransaction, utils::parse_quantity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};
use strum_macros::{Display, EnumString};

/// Declared bundle format
#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BundleFormat {
    /// Sent directly by an externally-owned account
    Eoa,
    /// Safe transaction builder (web UI) format
    SafeUi,
    /// Safe CLI format
    SafeCli,
}

impl BundleFormat {
    /// Whether bundles of this format are proposed to a multisig
    pub fn is_multisig(&self) -> bool {
        matches!(self, Self::SafeUi | Self::SafeCli)
    }
}

/// Summary record attached to a bundle
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewards: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_transactions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Counts may be numbers, numeric strings, or the list of counted items
fn count(val: &Value) -> Option<u64> {
    match val {
        Value::Array(items) => Some(items.len() as u64),
        Value::Null => None,
        other => parse_quantity(other).filter(|n| n.bits() <= 64).map(|n| n.as_u64()),
    }
}

fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

impl BundleSummary {
    /// Reads the summary field by field. A field of an unexpected type is dropped on its own,
    /// the others (the declared format in particular) are kept.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            vault_count: first(obj, &["vaultCount", "vaults"]).and_then(count),
            rewards: first(obj, &["rewards", "rewardDescription"]).map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            total_transactions: first(obj, &["totalTransactions", "transactionCount"])
                .and_then(count),
            format: obj.get("format").and_then(Value::as_str).map(str::to_string),
        }
    }

    /// Declared format, if it is one of the known formats
    pub fn format(&self) -> Option<BundleFormat> {
        self.format.as_deref().and_then(|f| BundleFormat::from_str(f).ok())
    }
}

impl fmt::Display for BundleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![];
        if let Some(vaults) = self.vault_count {
            parts.push(format!("{vaults} vaults"));
        }
        if let Some(rewards) = &self.rewards {
            parts.push(rewards.clone());
        }
        if let Some(total) = self.total_transactions {
            parts.push(format!("{total} transactions"));
        }
        if parts.is_empty() {
            write!(f, "no summary")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Shape a bundle was recognized as
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
#[strum(serialize_all = "kebab_case")]
pub enum BundleShape {
    Canonical,
    LegacyEoa,
    RawArray,
    Convertible,
}

/// Bundle contents, classified by shape
#[derive(Clone, Debug, PartialEq)]
pub enum BundleInput {
    /// `bundleData.transactions`
    Canonical { transactions: Vec<RawTransaction> },
    /// Format `eoa` with a top-level `transactions` sequence
    LegacyEoa { transactions: Vec<RawTransaction>, from: Option<String> },
    /// Any other object with a top-level `transactions` sequence
    RawArray { transactions: Vec<RawTransaction> },
    /// Safe-format call payloads that need converting before an EOA can send them
    Convertible { format: BundleFormat, payloads: Vec<RawTransaction>, from: Option<String> },
    /// A known sequence key is present but does not hold a sequence
    Missing { key: String },
    /// No transaction sequence on any key
    Unknown { keys: Vec<String> },
}

fn sequence(value: &[Value]) -> Vec<RawTransaction> {
    value.iter().map(RawTransaction::from_value).collect()
}

fn sender(obj: &Map<String, Value>) -> Option<String> {
    ["fromAddress", "from", "signerAddress"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

impl BundleInput {
    /// Classifies a JSON bundle. Checks, in order: canonical shape, legacy EOA shape, top-level
    /// sequence, Safe-format payloads. Anything else is [BundleInput::Unknown].
    ///
    /// # Arguments
    /// * `value` - The bundle JSON
    /// * `format` - The declared bundle format
    pub fn classify(value: &Value, format: Option<BundleFormat>) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Unknown { keys: vec![] };
        };

        let bundle_data = obj.get("bundleData");

        if let Some(txs) = bundle_data.and_then(Value::as_object).and_then(|d| d.get("transactions"))
        {
            return match txs.as_array() {
                Some(txs) => Self::Canonical { transactions: sequence(txs) },
                None => Self::Missing { key: "bundleData.transactions".into() },
            };
        }

        if let Some(txs) = obj.get("transactions") {
            return match (txs.as_array(), format) {
                (Some(txs), Some(BundleFormat::Eoa)) => {
                    Self::LegacyEoa { transactions: sequence(txs), from: sender(obj) }
                }
                (Some(txs), _) => Self::RawArray { transactions: sequence(txs) },
                (None, _) => Self::Missing { key: "transactions".into() },
            };
        }

        if let Some(format) = format.filter(BundleFormat::is_multisig) {
            let candidates = [
                ("bundleData", bundle_data),
                ("bundleData.payloads", bundle_data.and_then(|d| d.get("payloads"))),
                ("payloads", obj.get("payloads")),
            ];
            for (key, candidate) in candidates {
                match candidate {
                    Some(Value::Array(payloads)) => {
                        return Self::Convertible {
                            format,
                            payloads: sequence(payloads),
                            from: sender(obj),
                        }
                    }
                    Some(Value::Object(_)) | None => continue,
                    Some(_) => return Self::Missing { key: key.into() },
                }
            }
        }

        let mut keys: Vec<String> = obj.keys().cloned().collect();
        keys.sort();
        Self::Unknown { keys }
    }

    /// The shape, when the input is a recognized one
    pub fn shape(&self) -> Option<BundleShape> {
        match self {
            Self::Canonical { .. } => Some(BundleShape::Canonical),
            Self::LegacyEoa { .. } => Some(BundleShape::LegacyEoa),
            Self::RawArray { .. } => Some(BundleShape::RawArray),
            Self::Convertible { .. } => Some(BundleShape::Convertible),
            Self::Missing { .. } | Self::Unknown { .. } => None,
        }
    }

    /// Number of entries in the transaction sequence, if any
    pub fn len(&self) -> usize {
        match self {
            Self::Canonical { transactions } |
            Self::LegacyEoa { transactions, .. } |
            Self::RawArray { transactions } => transactions.len(),
            Self::Convertible { payloads, .. } => payloads.len(),
            Self::Missing { .. } | Self::Unknown { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The unit of work handed to the engine
#[derive(Clone, Debug, PartialEq)]
pub struct Bundle {
    /// Summary record
    pub summary: BundleSummary,
    /// Top-level format discriminator (legacy bundles carry it outside the summary)
    pub format: Option<BundleFormat>,
    /// Classified contents
    pub input: BundleInput,
    /// Where the bundle was written to, used for manual-upload instructions
    pub output_file: Option<PathBuf>,
    /// Keys that suggest the bundle targets a Safe, whatever its declared format
    pub safe_hints: Vec<String>,
}

const SAFE_HINT_KEYS: [&str; 3] = ["safeAddress", "safeTxHash", "createdFromSafeAddress"];

impl Bundle {
    /// Builds a bundle from its JSON representation
    pub fn from_value(value: &Value) -> Self {
        let obj = value.as_object();
        let summary =
            obj.and_then(|o| o.get("summary")).map(BundleSummary::from_value).unwrap_or_default();
        let format = obj
            .and_then(|o| o.get("format"))
            .and_then(Value::as_str)
            .and_then(|f| BundleFormat::from_str(f).ok());
        let output_file =
            obj.and_then(|o| o.get("outputFile")).and_then(Value::as_str).map(PathBuf::from);

        let declared = summary.format().or(format);
        let input = BundleInput::classify(value, declared);

        let mut safe_hints = vec![];
        let mut scan = |o: &Map<String, Value>| {
            for key in SAFE_HINT_KEYS {
                if o.contains_key(key) {
                    safe_hints.push(key.to_string());
                }
            }
        };
        if let Some(o) = obj {
            scan(o);
            if let Some(meta) = o.get("meta").and_then(Value::as_object) {
                scan(meta);
            }
        }

        Self { summary, format, input, output_file, safe_hints }
    }

    /// Reads a bundle from a JSON file. The file path becomes the bundle's output location.
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        let mut bundle = Self::from_value(&value);
        bundle.output_file = Some(path.to_path_buf());
        Ok(bundle)
    }

    /// Declared format: the summary format, or the top-level one for legacy bundles
    pub fn declared_format(&self) -> Option<BundleFormat> {
        self.summary.format().or(self.format)
    }

    /// Whether the declared format requires a multisig proposal
    pub fn is_multisig(&self) -> bool {
        self.declared_format().map(|f| f.is_multisig()).unwrap_or(false)
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = self.declared_format().map(|f| f.to_string());
        write!(
            f,
            "bundle(format: {}, transactions: {}",
            format.as_deref().unwrap_or("unspecified"),
            self.input.len()
        )?;
        if let Some(vaults) = self.summary.vault_count {
            write!(f, ", vaults: {vaults}")?;
        }
        if let Some(rewards) = &self.summary.rewards {
            write!(f, ", rewards: {rewards}")?;
        }
        write!(f, ")")
    }
}
