use thiserror::Error;

use crate::{chain::ChainError, units::AmountError, wallet::WalletError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid amount: {0}")]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("{0} must not be empty")]
    EmptyField(String),

    #[error("invalid chain id '{0}'")]
    InvalidChainId(String),

    #[error("no token connected, create or connect to a token first")]
    NoTokenConnected,

    #[error("insufficient allowance: requested {requested}, approved {approved} ({shortfall} short)")]
    InsufficientAllowance {
        requested: String,
        approved: String,
        shortfall: String,
    },

    #[error("invalid account selection '{0}'")]
    InvalidSelection(String),

    #[error("console error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
