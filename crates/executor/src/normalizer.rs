use crate::{
    collaborators::{ConversionContext, PayloadEstimator},
    errors::NormalizationError,
};
use ethers::utils::to_checksum;
use reclaim_primitives::{
    utils::as_hex_quantity, Bundle, BundleFormat, BundleInput, BundleShape, RawTransaction,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Metadata carried alongside the canonical transaction sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleMeta {
    /// Shape the bundle was recognized as
    pub shape: BundleShape,
    /// Declared format
    pub format: Option<BundleFormat>,
    /// Sender carried over from legacy or converted bundles
    pub from: Option<String>,
}

/// A bundle reduced to its canonical form
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedBundle {
    pub transactions: Vec<RawTransaction>,
    pub meta: BundleMeta,
}

/// Reduces bundles of any supported shape to one ordered transaction sequence
#[derive(Clone)]
pub struct BundleNormalizer {
    estimator: Arc<dyn PayloadEstimator>,
}

impl BundleNormalizer {
    pub fn new(estimator: Arc<dyn PayloadEstimator>) -> Self {
        Self { estimator }
    }

    /// Maps the bundle to its transaction sequence without touching the chain. Safe-format
    /// payloads are returned as they are.
    pub fn normalize_for_proposal(bundle: &Bundle) -> Result<NormalizedBundle, NormalizationError> {
        let format = bundle.declared_format();
        let (transactions, shape, from) = match &bundle.input {
            BundleInput::Canonical { transactions } => {
                (transactions.clone(), BundleShape::Canonical, None)
            }
            BundleInput::LegacyEoa { transactions, from } => {
                (transactions.clone(), BundleShape::LegacyEoa, from.clone())
            }
            BundleInput::RawArray { transactions } => {
                (transactions.clone(), BundleShape::RawArray, None)
            }
            BundleInput::Convertible { payloads, from, .. } => {
                (payloads.clone(), BundleShape::Convertible, from.clone())
            }
            BundleInput::Missing { key } => {
                return Err(NormalizationError::MissingTransactions { key: key.clone() })
            }
            BundleInput::Unknown { keys } => {
                return Err(NormalizationError::UnsupportedFormat { keys: keys.clone() })
            }
        };

        debug!("Bundle recognized as {shape} with {} transactions", transactions.len());

        Ok(NormalizedBundle { transactions, meta: BundleMeta { shape, format, from } })
    }

    /// Normalizes a bundle for sending from an EOA.
    ///
    /// Safe-format payloads are converted: gas is estimated for each of them, and sender,
    /// fee-market fields and chain id are attached.
    ///
    /// # Arguments
    /// * `bundle` - The [Bundle](Bundle)
    /// * `ctx` - Sender and chain data used for conversion
    ///
    /// # Returns
    /// * `NormalizedBundle` - The canonical transaction sequence
    pub async fn normalize(
        &self,
        bundle: &Bundle,
        ctx: &ConversionContext,
    ) -> Result<NormalizedBundle, NormalizationError> {
        let mut normalized = Self::normalize_for_proposal(bundle)?;

        if normalized.meta.shape == BundleShape::Convertible {
            normalized.transactions = self.convert(normalized.transactions, ctx).await;
            normalized.meta.from = Some(to_checksum(&ctx.from, None));
        }

        info!(
            "Normalized {} bundle: {} transactions",
            normalized.meta.shape,
            normalized.transactions.len()
        );

        Ok(normalized)
    }

    async fn convert(
        &self,
        payloads: Vec<RawTransaction>,
        ctx: &ConversionContext,
    ) -> Vec<RawTransaction> {
        // entries without destination or data are not estimated, validation drops them later
        let (positions, estimable): (Vec<usize>, Vec<RawTransaction>) = payloads
            .iter()
            .enumerate()
            .filter(|(_, p)| p.to.is_some() && p.data.is_some())
            .map(|(i, p)| (i, p.clone()))
            .unzip();

        let estimated = match self.estimator.estimate_gas_for_payloads(estimable, ctx.from).await
        {
            Ok(estimated) if estimated.len() == positions.len() => Some(estimated),
            Ok(estimated) => {
                warn!(
                    "Gas estimation returned {} payloads for {} requested, ignoring estimates",
                    estimated.len(),
                    positions.len()
                );
                None
            }
            Err(err) => {
                warn!("Gas estimation of payloads failed, limits will be estimated at send time: {err:?}");
                None
            }
        };

        let mut converted = payloads;
        if let Some(estimated) = estimated {
            for (pos, payload) in positions.into_iter().zip(estimated) {
                converted[pos].gas_limit = payload.gas_limit;
            }
        }

        let from = to_checksum(&ctx.from, None);
        for tx in converted.iter_mut() {
            tx.from = Some(from.clone());
            tx.tx_type = Some(Value::from(2));
            tx.chain_id = Some(Value::from(ctx.chain_id));
            tx.gas_price = None;
            if let Some(fee) = ctx.max_fee_per_gas {
                tx.max_fee_per_gas = Some(Value::from(as_hex_quantity(&fee)));
            }
            if let Some(fee) = ctx.max_priority_fee_per_gas {
                tx.max_priority_fee_per_gas = Some(Value::from(as_hex_quantity(&fee)));
            }
        }

        converted
    }
}
