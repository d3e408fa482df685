//! Safe transaction service adapter
use crate::{
    collaborators::{MultisigProposal, ProposalReceipt, SafeAdapter},
    errors::ExecutionError,
    multisend::multisend_calldata,
};
use alloy_chains::Chain;
use async_trait::async_trait;
use ethers::{
    abi::{self, Token},
    types::{Address, Bytes, H256, U256},
    utils::{keccak256, to_checksum},
};
use reclaim_primitives::{
    chain::ChainExt,
    constants::{
        multisend::{OPERATION_CALL, OPERATION_DELEGATE_CALL},
        safe::{DOMAIN_TYPE, ORIGIN, SAFE_TX_TYPE},
    },
    utils::{as_checksum_addr, parse_quantity},
    Transaction, Wallet,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// The transaction a Safe executes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafeTx {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: u8,
    pub nonce: U256,
}

impl SafeTx {
    /// One call is executed directly, several are delegated to the multisend contract
    pub fn from_calls(calls: &[Transaction], multisend: Address, nonce: U256) -> Self {
        match calls {
            [call] => Self {
                to: call.to,
                value: call.value,
                data: call.data.clone(),
                operation: OPERATION_CALL,
                nonce,
            },
            calls => Self {
                to: multisend,
                value: U256::zero(),
                data: multisend_calldata(calls),
                operation: OPERATION_DELEGATE_CALL,
                nonce,
            },
        }
    }

    /// EIP-712 domain separator of a Safe
    pub fn domain_separator(chain_id: u64, safe: Address) -> H256 {
        H256(keccak256(abi::encode(&[
            Token::FixedBytes(keccak256(DOMAIN_TYPE).to_vec()),
            Token::Uint(U256::from(chain_id)),
            Token::Address(safe),
        ])))
    }

    /// EIP-712 hash signed by the owners. Gas refund fields are always zero.
    pub fn hash(&self, chain_id: u64, safe: Address) -> H256 {
        let struct_hash = keccak256(abi::encode(&[
            Token::FixedBytes(keccak256(SAFE_TX_TYPE).to_vec()),
            Token::Address(self.to),
            Token::Uint(self.value),
            Token::FixedBytes(keccak256(&self.data).to_vec()),
            Token::Uint(U256::from(self.operation)),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Address(Address::zero()),
            Token::Address(Address::zero()),
            Token::Uint(self.nonce),
        ]));

        let mut digest = Vec::with_capacity(66);
        digest.extend_from_slice(&[0x19, 0x01]);
        digest.extend_from_slice(Self::domain_separator(chain_id, safe).as_bytes());
        digest.extend_from_slice(&struct_hash);
        H256(keccak256(digest))
    }
}

#[derive(Debug, Deserialize)]
struct SafesResponse {
    safes: Vec<Address>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposeRequest {
    #[serde(serialize_with = "as_checksum_addr")]
    to: Address,
    value: String,
    data: Option<Bytes>,
    operation: u8,
    safe_tx_gas: String,
    base_gas: String,
    gas_price: String,
    #[serde(serialize_with = "as_checksum_addr")]
    gas_token: Address,
    #[serde(serialize_with = "as_checksum_addr")]
    refund_receiver: Address,
    nonce: String,
    contract_transaction_hash: H256,
    #[serde(serialize_with = "as_checksum_addr")]
    sender: Address,
    signature: Bytes,
    origin: String,
}

/// Client of the Safe transaction service
#[derive(Clone, Debug)]
pub struct SafeTransactionService {
    client: reqwest::Client,
    chain: Chain,
    service_url: Option<String>,
    app_url: String,
    multisend: Address,
}

impl SafeTransactionService {
    /// Creates a client of the service for the chain
    ///
    /// # Arguments
    /// * `chain` - The chain the Safes live on
    /// * `service_url` - Service base URL, defaults to the public service of the chain
    /// * `app_url` - Safe web application used for review links
    /// * `multisend` - MultiSendCallOnly contract used for multi-call proposals
    pub fn new(
        chain: Chain,
        service_url: Option<String>,
        app_url: String,
        multisend: Address,
    ) -> eyre::Result<Self> {
        let service_url = service_url
            .or_else(|| chain.safe_service_url().map(String::from))
            .map(|url| url.trim_end_matches('/').to_string());

        Ok(Self { client: reqwest::Client::builder().build()?, chain, service_url, app_url, multisend })
    }

    fn endpoint(&self, path: &str) -> eyre::Result<String> {
        let service_url = self.service_url.as_deref().ok_or_else(|| {
            eyre::eyre!("No Safe transaction service known for chain {}", self.chain)
        })?;
        Ok(format!("{service_url}/api/v1/{path}"))
    }

    async fn nonce(&self, safe: Address) -> eyre::Result<U256> {
        let info = self
            .client
            .get(self.endpoint(&format!("safes/{}/", to_checksum(&safe, None)))?)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        info.get("nonce")
            .and_then(parse_quantity)
            .ok_or_else(|| eyre::eyre!("Safe {safe:?} has no nonce in service response"))
    }

    /// Review link of a proposed transaction
    pub fn transaction_url(&self, safe: Address, safe_tx_hash: H256) -> String {
        self.chain.safe_transaction_url(
            &self.app_url,
            &to_checksum(&safe, None),
            &format!("{safe_tx_hash:?}"),
        )
    }
}

#[async_trait]
impl SafeAdapter for SafeTransactionService {
    async fn get_safes_by_owner(&self, owner: Address) -> eyre::Result<Vec<Address>> {
        let res = self
            .client
            .get(self.endpoint(&format!("owners/{}/safes/", to_checksum(&owner, None)))?)
            .send()
            .await?
            .error_for_status()?
            .json::<SafesResponse>()
            .await?;

        debug!("Safes owned by {owner:?}: {:?}", res.safes);

        Ok(res.safes)
    }

    async fn execute(
        &self,
        proposal: &MultisigProposal,
        signer: &Wallet,
    ) -> eyre::Result<ProposalReceipt> {
        let safe = proposal.safe_address;
        let nonce = self.nonce(safe).await?;
        let tx = SafeTx::from_calls(&proposal.transactions, self.multisend, nonce);
        let safe_tx_hash = tx.hash(self.chain.id(), safe);
        let signature = signer.sign_hash(safe_tx_hash)?;

        let request = ProposeRequest {
            to: tx.to,
            value: tx.value.to_string(),
            data: (!tx.data.is_empty()).then(|| tx.data.clone()),
            operation: tx.operation,
            safe_tx_gas: "0".into(),
            base_gas: "0".into(),
            gas_price: "0".into(),
            gas_token: Address::zero(),
            refund_receiver: Address::zero(),
            nonce: nonce.to_string(),
            contract_transaction_hash: safe_tx_hash,
            sender: proposal.signer_address,
            signature: signature.to_vec().into(),
            origin: ORIGIN.into(),
        };

        let url = self.endpoint(&format!("safes/{}/multisig-transactions/", to_checksum(&safe, None)))?;
        let res = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ExecutionError::Collaborator {
                collaborator: "Safe transaction service",
                inner: format!("{status}: {body}"),
            }
            .into());
        }

        info!("Proposed Safe transaction {safe_tx_hash:?} with nonce {nonce} to {safe:?}");

        Ok(ProposalReceipt {
            safe_tx_hash: format!("{safe_tx_hash:?}"),
            transaction_url: self.transaction_url(safe, safe_tx_hash),
        })
    }
}
