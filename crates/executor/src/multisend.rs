//! MultiSend packed encoding
use ethers::{
    abi::{self, Token},
    types::{Address, Bytes, U256},
    utils::id,
};
use reclaim_primitives::{
    constants::multisend::{MULTI_SEND_SIGNATURE, OPERATION_CALL},
    Transaction, TxKind,
};

fn push_word(buf: &mut Vec<u8>, word: U256) {
    let mut bytes = [0u8; 32];
    word.to_big_endian(&mut bytes);
    buf.extend_from_slice(&bytes);
}

/// Packs calls as `operation (1) | to (20) | value (32) | data length (32) | data`
pub fn encode_packed(txs: &[Transaction]) -> Bytes {
    let mut packed = Vec::with_capacity(txs.iter().map(|tx| 85 + tx.data.len()).sum());
    for tx in txs {
        packed.push(OPERATION_CALL);
        packed.extend_from_slice(tx.to.as_bytes());
        push_word(&mut packed, tx.value);
        push_word(&mut packed, U256::from(tx.data.len()));
        packed.extend_from_slice(&tx.data);
    }
    packed.into()
}

/// Call data of `multiSend(bytes)` for the calls
pub fn multisend_calldata(txs: &[Transaction]) -> Bytes {
    let mut data = id(MULTI_SEND_SIGNATURE).to_vec();
    data.extend(abi::encode(&[Token::Bytes(encode_packed(txs).to_vec())]));
    data.into()
}

/// Builds the single transaction executing every call through the multisend contract.
///
/// The batch carries the sum of the call values, and a gas limit only when every call has one.
pub fn build_batch(txs: &[Transaction], multisend: Address) -> Transaction {
    let value = txs.iter().fold(U256::zero(), |acc, tx| acc.saturating_add(tx.value));
    let gas_limit = txs
        .iter()
        .map(|tx| tx.gas_limit)
        .try_fold(U256::zero(), |acc, gas| gas.map(|gas| acc.saturating_add(gas)));

    Transaction {
        index: txs.first().map(|tx| tx.index).unwrap_or_default(),
        to: multisend,
        data: multisend_calldata(txs),
        value,
        gas_limit,
        kind: TxKind::Eip1559,
        fees: Default::default(),
    }
}
