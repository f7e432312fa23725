use ethers::types::Address;

use crate::{
    error::{AppError, Result},
    network::Network,
    wallet::AccountWallet,
};

/// In-memory state of one CLI run: known accounts, which one signs, and the
/// token operations are aimed at. Nothing here outlives the process.
#[derive(Debug)]
pub struct Session {
    accounts: Vec<AccountWallet>,
    current: usize,
    token: Option<Address>,
    network: Network,
}

impl Session {
    pub fn new(network: Network, primary: AccountWallet) -> Self {
        Self {
            accounts: vec![primary],
            current: 0,
            token: None,
            network,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn accounts(&self) -> &[AccountWallet] {
        &self.accounts
    }

    pub fn current(&self) -> &AccountWallet {
        &self.accounts[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Appends an account and returns its zero-based index.
    pub fn add_account(&mut self, account: AccountWallet) -> usize {
        self.accounts.push(account);
        self.accounts.len() - 1
    }

    /// Looks up an account by the 1-based position shown in listings.
    pub fn account_at(&self, position: usize) -> Option<(usize, &AccountWallet)> {
        let index = position.checked_sub(1)?;
        self.accounts.get(index).map(|account| (index, account))
    }

    pub fn set_current(&mut self, index: usize) -> Result<&AccountWallet> {
        if index >= self.accounts.len() {
            return Err(AppError::InvalidSelection((index + 1).to_string()));
        }
        self.current = index;
        Ok(&self.accounts[index])
    }

    pub fn token(&self) -> Option<Address> {
        self.token
    }

    pub fn require_token(&self) -> Result<Address> {
        self.token.ok_or(AppError::NoTokenConnected)
    }

    pub fn connect_token(&mut self, token: Address) {
        self.token = Some(token);
    }

    pub fn disconnect_token(&mut self) {
        self.token = None;
    }
}
