//! Keystore-backed wallet service
use async_trait::async_trait;
use expanded_pathbuf::ExpandedPathBuf;
use reclaim_executor::WalletService;
use reclaim_primitives::{utils::is_checksummed_address, Wallet};
use tracing::debug;

/// Keys stored as encrypted keystore files, one file per key name
#[derive(Clone, Debug)]
pub struct KeystoreWalletService {
    dir: ExpandedPathBuf,
}

impl KeystoreWalletService {
    pub fn new(dir: ExpandedPathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl WalletService for KeystoreWalletService {
    fn has_private_key(&self, name: &str) -> bool {
        self.dir.join(name).is_file()
    }

    async fn create_signer(&self, name: &str, password: &str) -> eyre::Result<Wallet> {
        let path = self.dir.join(name);
        let password = password.to_string();
        debug!("Decrypting keystore {path:?}");

        // keystore decryption is CPU bound (scrypt)
        tokio::task::spawn_blocking(move || Wallet::from_keystore(path, &password)).await?
    }

    fn is_valid_address(&self, address: &str) -> bool {
        is_checksummed_address(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unlocks_keystore_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = ExpandedPathBuf(dir.path().to_path_buf());
        let created = Wallet::create_keystore(path.clone(), "operator", "hunter2").unwrap();

        let service = KeystoreWalletService::new(path);
        assert!(service.has_private_key("operator"));
        assert!(!service.has_private_key("someone"));

        let wallet = service.create_signer("operator", "hunter2").await.unwrap();
        assert_eq!(wallet.address(), created.address());
        assert!(service.create_signer("operator", "wrong").await.is_err());
    }

    #[test]
    fn address_validation() {
        let service = KeystoreWalletService::new(ExpandedPathBuf(std::env::temp_dir()));
        assert!(service.is_valid_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"));
        assert!(!service.is_valid_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96046"));
        assert!(!service.is_valid_address("vitalik.eth"));
    }
}
