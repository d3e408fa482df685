//! Misc utils

use ethers::{
    types::{Address, Bytes, U256},
    utils::to_checksum,
};
use serde_json::Value;
use std::str::FromStr;

/// Converts address to checksum address
pub fn as_checksum_addr<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}

/// Parses an address, enforcing the EIP-55 checksum when the input is mixed-case.
///
/// All-lowercase and all-uppercase inputs carry no checksum and are accepted as is.
pub fn parse_checksummed_address(s: &str) -> Option<Address> {
    let trimmed = s.trim();
    let hex = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let addr = Address::from_str(hex).ok()?;

    let mixed_case = hex.chars().any(|c| c.is_ascii_lowercase()) &&
        hex.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case && to_checksum(&addr, None)[2..] != *hex {
        return None;
    }

    Some(addr)
}

/// Returns true if the string is a well-formed (and, if mixed-case, correctly checksummed)
/// address
pub fn is_checksummed_address(s: &str) -> bool {
    parse_checksummed_address(s).is_some()
}

/// Parses a quantity given as a hex string, a decimal string or a JSON number.
///
/// `null`, `""` and `"0x"` are read as zero. Negative and fractional numbers are rejected.
pub fn parse_quantity(val: &Value) -> Option<U256> {
    match val {
        Value::Null => Some(U256::zero()),
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(U256::zero());
            }
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some("") => Some(U256::zero()),
                Some(hex) => U256::from_str_radix(hex, 16).ok(),
                None => U256::from_dec_str(s).ok(),
            }
        }
        _ => None,
    }
}

/// Parses `0x`-prefixed call data. `"0x"` is valid and means empty call data.
pub fn parse_call_data(s: &str) -> Option<Bytes> {
    let s = s.trim();
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Bytes::from_str(hex).ok()
}

/// Formats a quantity as `0x`-prefixed hex
pub fn as_hex_quantity(val: &U256) -> String {
    format!("{val:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checksummed_address() {
        assert!(parse_checksummed_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").is_some());
        assert!(parse_checksummed_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").is_some());
        assert!(parse_checksummed_address("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045").is_some());
        // one character flipped
        assert!(parse_checksummed_address("0xd8da6BF26964aF9D7eEd9e03E53415D37aA96045").is_none());
        assert!(parse_checksummed_address("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045").is_none());
        assert!(parse_checksummed_address("0x1234").is_none());
        assert!(parse_checksummed_address("0xzz").is_none());
    }

    #[test]
    fn quantities() {
        assert_eq!(parse_quantity(&json!(null)), Some(U256::zero()));
        assert_eq!(parse_quantity(&json!("0x0")), Some(U256::zero()));
        assert_eq!(parse_quantity(&json!("0x")), Some(U256::zero()));
        assert_eq!(parse_quantity(&json!("0x10")), Some(U256::from(16)));
        assert_eq!(parse_quantity(&json!("1000")), Some(U256::from(1000)));
        assert_eq!(parse_quantity(&json!(42)), Some(U256::from(42)));
        assert_eq!(parse_quantity(&json!(-1)), None);
        assert_eq!(parse_quantity(&json!(1.5)), None);
        assert_eq!(parse_quantity(&json!("-3")), None);
        assert_eq!(parse_quantity(&json!([1])), None);
    }

    #[test]
    fn call_data() {
        assert_eq!(parse_call_data("0x1234").unwrap().to_vec(), vec![0x12, 0x34]);
        assert!(parse_call_data("0x").unwrap().is_empty());
        assert!(parse_call_data("1234").is_none());
        assert!(parse_call_data("0x123").is_none());
        assert!(parse_call_data("0xzz").is_none());
    }

    #[test]
    fn hex_quantity() {
        assert_eq!(as_hex_quantity(&U256::zero()), "0x0");
        assert_eq!(as_hex_quantity(&U256::from(255)), "0xff");
    }
}
