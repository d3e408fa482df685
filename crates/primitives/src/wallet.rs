//! A `Wallet` is a wrapper around an ethers local wallet backed by an encrypted keystore
use ethers::{
    prelude::rand,
    signers::{LocalWallet, Signer},
    types::{Address, Signature, H256},
};
use expanded_pathbuf::ExpandedPathBuf;
use std::{fs, path::Path};

/// Wrapper around ethers wallet
#[derive(Clone, Debug)]
pub struct Wallet {
    /// Signing key of the wallet
    pub signer: LocalWallet,
}

impl Wallet {
    /// Generates a new key and stores it encrypted in the keystore directory
    ///
    /// # Arguments
    /// * `dir` - The keystore directory
    /// * `name` - The keystore file name
    /// * `password` - The password used to encrypt the key
    ///
    /// # Returns
    /// * `Self` - A new `Wallet` instance
    pub fn create_keystore(dir: ExpandedPathBuf, name: &str, password: &str) -> eyre::Result<Self> {
        let mut rng = rand::thread_rng();

        fs::create_dir_all(&dir)?;
        if dir.join(name).exists() {
            return Err(eyre::eyre!("Keystore {name} already exists in {:?}", dir.to_path_buf()));
        }

        let (signer, _) = LocalWallet::new_keystore(dir.to_path_buf(), &mut rng, password, Some(name))?;

        Ok(Self { signer })
    }

    /// Decrypts a keystore file
    ///
    /// # Arguments
    /// * `path` - The path of the keystore file
    /// * `password` - The keystore password
    ///
    /// # Returns
    /// * `Self` - A new `Wallet` instance
    pub fn from_keystore(path: impl AsRef<Path>, password: &str) -> eyre::Result<Self> {
        let signer = LocalWallet::decrypt_keystore(path, password)?;
        Ok(Self { signer })
    }

    /// Create a new wallet from a hex-encoded private key
    pub fn from_private_key(key: &str) -> eyre::Result<Self> {
        let signer = key.trim().trim_start_matches("0x").parse::<LocalWallet>()?;
        Ok(Self { signer })
    }

    /// Address of the wallet
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs a 32-byte digest without any message prefix
    pub fn sign_hash(&self, hash: H256) -> eyre::Result<Signature> {
        Ok(self.signer.sign_hash(hash)?)
    }
}
