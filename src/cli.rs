use clap::Parser;

/// Interactive client for deploying and managing factory-issued ERC20 tokens.
///
/// Every connection parameter may be passed as a flag or through the
/// environment; anything left unset is asked for on startup.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON-RPC endpoint of the chain
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Numeric chain id used when signing transactions
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: Option<String>,

    /// Address of the token factory contract
    #[arg(long, env = "FACTORY_ADDRESS")]
    pub factory: Option<String>,

    /// Private key of the primary account
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Symbol shown next to native currency balances
    #[arg(long, env = "CURRENCY_SYMBOL", default_value = "ETH")]
    pub currency_symbol: String,

    /// How long to wait for a transaction to be mined before giving up
    #[arg(long, env = "CONFIRMATION_TIMEOUT_SECS", default_value_t = 300)]
    pub confirmation_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
