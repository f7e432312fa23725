use std::{fmt, time::Duration};

use ethers::types::Address;
use tracing::debug;

use crate::{
    cli::Args,
    error::{AppError, Result},
    terminal::prompt::{Field, Prompter},
    wallet::{display_address, parse_address},
};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

#[derive(Debug, Clone)]
pub struct Network {
    pub rpc_url: String,
    pub chain_id: u64,
    pub factory: Address,
    pub currency_symbol: String,
    pub confirmation_timeout: Duration,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (chain id: {}, factory: {})",
            self.rpc_url,
            self.chain_id,
            display_address(self.factory)
        )
    }
}

impl Network {
    /// Builds the connection parameters from flags and environment, asking
    /// for whatever is missing. Returns the primary private key alongside.
    pub fn resolve<P: Prompter>(args: &Args, prompter: &mut P) -> Result<(Self, String)> {
        let rpc_url = match present(&args.rpc_url) {
            Some(url) => url,
            None => required(
                prompter,
                Field::new("RPC URL").with_default(DEFAULT_RPC_URL),
            )?,
        };

        let chain_id = match present(&args.chain_id) {
            Some(chain_id) => chain_id,
            None => required(prompter, Field::new("Chain id"))?,
        };
        let chain_id = chain_id
            .parse::<u64>()
            .map_err(|_| AppError::InvalidChainId(chain_id.clone()))?;

        let factory = match present(&args.factory) {
            Some(factory) => factory,
            None => required(prompter, Field::new("Token factory address"))?,
        };
        let factory = parse_address(&factory)?;

        let private_key = match present(&args.private_key) {
            Some(key) => key,
            None => {
                let key = prompter.secret("Primary account private key")?;
                if key.trim().is_empty() {
                    return Err(AppError::EmptyField("Private key".to_owned()));
                }
                key
            }
        };

        let network = Self {
            rpc_url,
            chain_id,
            factory,
            currency_symbol: args.currency_symbol.to_owned(),
            confirmation_timeout: Duration::from_secs(args.confirmation_timeout_secs),
        };

        debug!(%network, "resolved connection parameters");

        Ok((network, private_key))
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn required<P: Prompter>(prompter: &mut P, field: Field) -> Result<String> {
    let answer = prompter.text(&field)?;
    let answer = answer.trim();

    if answer.is_empty() {
        return Err(AppError::EmptyField(field.label().to_owned()));
    }

    Ok(answer.to_owned())
}
