use std::{fmt, time::Duration};

use async_trait::async_trait;
use ethers::{
    providers::ProviderError,
    types::{Address, TxHash, U256},
};
use thiserror::Error;

use crate::{units::format_amount, wallet::display_address, wallet::AccountWallet};

pub use client::EthersChain;

mod client;
#[cfg(test)]
pub mod mock;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("invalid RPC URL '{url}': {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("transaction {0:?} was not confirmed within {1:?}")]
    ConfirmationTimeout(TxHash, Duration),

    #[error("transaction {0:?} was dropped before confirmation")]
    Dropped(TxHash),

    #[error("transaction {0:?} reverted")]
    Reverted(TxHash),

    #[error("receipt of {0:?} carries no block number")]
    MissingBlock(TxHash),
}

/// Outcome of a factory `createToken` call. `token` is `None` when the
/// confirmation block holds no creation event from the factory.
#[derive(Debug, Clone, Copy)]
pub struct CreatedToken {
    pub tx_hash: TxHash,
    pub token: Option<Address>,
}

#[derive(Debug, Clone)]
pub struct TokenDetails {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub holder: Address,
    pub balance: U256,
}

impl fmt::Display for TokenDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Token:        {} ({})", self.name, self.symbol)?;
        writeln!(f, "Address:      {}", display_address(self.address))?;
        writeln!(f, "Decimals:     {}", self.decimals)?;
        writeln!(
            f,
            "Total supply: {} {}",
            format_amount(self.total_supply, self.decimals),
            self.symbol
        )?;
        write!(
            f,
            "Balance of {}: {} {}",
            display_address(self.holder),
            format_amount(self.balance, self.decimals),
            self.symbol
        )
    }
}

/// Everything the dispatcher needs from the chain: token reads, signed token
/// writes that wait for confirmation, and the factory deployment.
#[async_trait]
pub trait TokenChain: Send + Sync {
    /// Points all subsequent writes at `account`.
    fn bind_signer(&mut self, account: &AccountWallet);

    fn signer_address(&self) -> Address;

    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError>;

    async fn name(&self, token: Address) -> Result<String, ChainError>;

    async fn symbol(&self, token: Address) -> Result<String, ChainError>;

    async fn decimals(&self, token: Address) -> Result<u8, ChainError>;

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError>;

    async fn create_token(
        &self,
        name: &str,
        symbol: &str,
        owner: Address,
    ) -> Result<CreatedToken, ChainError>;

    async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<TxHash, ChainError>;

    async fn burn(&self, token: Address, amount: U256) -> Result<TxHash, ChainError>;

    async fn transfer(&self, token: Address, to: Address, amount: U256)
        -> Result<TxHash, ChainError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError>;

    async fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError>;
}

/// Reads the five independent token values concurrently; any failed read
/// fails the whole batch.
pub async fn token_details<C>(
    chain: &C,
    token: Address,
    holder: Address,
) -> Result<TokenDetails, ChainError>
where
    C: TokenChain + ?Sized,
{
    let (name, symbol, decimals, total_supply, balance) = futures::try_join!(
        chain.name(token),
        chain.symbol(token),
        chain.decimals(token),
        chain.total_supply(token),
        chain.balance_of(token, holder),
    )?;

    Ok(TokenDetails {
        address: token,
        name,
        symbol,
        decimals,
        total_supply,
        holder,
        balance,
    })
}
