use std::fmt;

use ethers::{
    prelude::rand::{self, RngCore},
    signers::{LocalWallet, Signer},
    types::Address,
    utils::{hex, to_checksum},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
}

/// A local signing identity. The address is always read off the wallet, so it
/// can never drift from the key it was derived from.
#[derive(Clone)]
pub struct AccountWallet {
    name: String,
    private_key: String,
    wallet: LocalWallet,
}

impl fmt::Display for AccountWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {} \t Address: {}", self.name, self.checksum())
    }
}

impl fmt::Debug for AccountWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountWallet")
            .field("name", &self.name)
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl AccountWallet {
    pub fn from_private_key(name: impl Into<String>, private_key: &str) -> Result<Self, WalletError> {
        let normalized = normalize_private_key(private_key);

        // LocalWallet's parser wants bare hex
        let wallet = normalized
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|err| WalletError::InvalidKey(err.to_string()))?;

        Ok(Self {
            name: name.into(),
            private_key: normalized,
            wallet,
        })
    }

    pub fn generate(name: impl Into<String>) -> Result<Self, WalletError> {
        let mut rng = rand::thread_rng();
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);

        Self::from_private_key(name, &hex::encode(key))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn checksum(&self) -> String {
        to_checksum(&self.address(), None)
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }
}

/// Trims the key, lowercases it and makes sure it carries the `0x` marker.
pub fn normalize_private_key(input: &str) -> String {
    let trimmed = input.trim();
    let bare = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    format!("0x{}", bare.to_lowercase())
}

/// Parses a user-typed address, accepting it with or without the `0x` marker.
pub fn parse_address(input: &str) -> Result<Address, WalletError> {
    let trimmed = input.trim();
    let bare = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if bare.len() != 40 || !bare.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::InvalidAddress(trimmed.to_owned()));
    }

    format!("0x{}", bare)
        .parse::<Address>()
        .map_err(|_| WalletError::InvalidAddress(trimmed.to_owned()))
}

pub fn display_address(address: Address) -> String {
    to_checksum(&address, None)
}
