//! Execution-related constants

/// Gas estimation
pub mod gas {
    /// Gas estimation buffer on the primary sending path (in percent)
    pub const PRIMARY_MULTIPLIER_PERC: u64 = 150;
    /// Gas estimation buffer on the fallback sending path (in percent)
    pub const FALLBACK_MULTIPLIER_PERC: u64 = 130;
    /// Lowest gas estimation buffer accepted (in percent)
    pub const MIN_MULTIPLIER_PERC: u64 = 130;
    /// Gas limit used on the primary path when estimation fails
    pub const PRIMARY_DEFAULT_LIMIT: u64 = 5_000_000;
    /// Gas limit used on the fallback path when estimation fails
    pub const FALLBACK_DEFAULT_LIMIT: u64 = 3_000_000;
}

/// Sequential execution
pub mod execution {
    /// Delay between two submissions from the same signer (in milliseconds)
    pub const INTER_TX_DELAY_MS: u64 = 2000;
    /// Number of confirmations awaited per transaction
    pub const CONFIRMATIONS: usize = 1;
    /// Receipt polling interval (in milliseconds)
    pub const RECEIPT_POLL_INTERVAL_MS: u64 = 500;
}

/// Safe MultiSend contracts
pub mod multisend {
    /// MultiSendCallOnly v1.3.0 (canonical deployment)
    pub const CALL_ONLY_ADDRESS: &str = "0x40A2aCCbd92BCA938b02010E17A5b8929b49130D";
    /// Signature of the multisend entry function
    pub const MULTI_SEND_SIGNATURE: &str = "multiSend(bytes)";
    /// `CALL` operation
    pub const OPERATION_CALL: u8 = 0;
    /// `DELEGATECALL` operation
    pub const OPERATION_DELEGATE_CALL: u8 = 1;
}

/// Safe transaction service
pub mod safe {
    /// Safe web application used for review links
    pub const APP_URL: &str = "https://app.safe.global";
    /// Origin reported to the transaction service
    pub const ORIGIN: &str = "reclaim";
    /// EIP-712 domain type of Safe >= 1.3.0
    pub const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";
    /// EIP-712 SafeTx type
    pub const SAFE_TX_TYPE: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";
}

/// Keystore
pub mod keystore {
    /// Default keystore directory (relative to the home directory)
    pub const DEFAULT_DIR: &str = ".reclaim/keystore";
}
