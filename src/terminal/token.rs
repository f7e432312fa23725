use console::style;
use ethers::types::Address;
use tracing::{info, warn};

use super::{prompt::Field, Terminal};
use crate::{
    chain::{token_details, TokenChain, TokenDetails},
    error::Result,
    terminal::prompt::Prompter,
    units::format_amount,
    wallet::display_address,
};

impl<C: TokenChain, P: Prompter> Terminal<C, P> {
    pub(super) async fn create_token(&mut self) -> Result<()> {
        let name = self.ask_required(Field::new("Token name"))?;
        let symbol = self.ask_required(Field::new("Token symbol"))?;
        let owner_field = self.own_address_field("Initial owner");
        let owner = self.ask_address(owner_field)?;

        let created = self
            .with_spinner(
                "Deploying token...",
                self.chain.create_token(&name, &symbol, owner),
            )
            .await?;

        println!("TX Hash: {:?}", created.tx_hash);

        match created.token {
            Some(token) => {
                info!(token = %display_address(token), %symbol, "token created");
                self.session.connect_token(token);
                self.load_details(token).await?;
                println!("{}", style("Token created and connected!").green());
            }
            None => {
                warn!(tx = ?created.tx_hash, "no TokenCreated event in confirmation block");
                println!(
                    "{}",
                    style("Token created event not found, connected token unchanged").yellow()
                );
            }
        }

        Ok(())
    }

    pub(super) async fn connect_token(&mut self) -> Result<()> {
        let token = self.ask_address(Field::new("Token address"))?;

        self.session.connect_token(token);
        self.load_details(token).await?;

        info!(token = %display_address(token), "token connected");
        println!("{}", style("Connected!").green());

        Ok(())
    }

    pub(super) async fn token_details(&mut self) -> Result<()> {
        let token = self.session.require_token()?;

        self.load_details(token).await?;

        Ok(())
    }

    pub(super) async fn check_balance(&mut self) -> Result<()> {
        let token = self.session.require_token()?;
        let owner_field = self.own_address_field("Address");
        let owner = self.ask_address(owner_field)?;

        let (decimals, balance) = futures::try_join!(
            self.chain.decimals(token),
            self.chain.balance_of(token, owner)
        )?;

        println!(
            "Balance of {}: {}",
            display_address(owner),
            style(format_amount(balance, decimals)).green()
        );

        Ok(())
    }

    pub(super) async fn check_allowance(&mut self) -> Result<()> {
        let token = self.session.require_token()?;
        let owner_field = self.own_address_field("Owner address");
        let owner = self.ask_address(owner_field)?;
        let spender = self.ask_address(Field::new("Spender address"))?;

        let (decimals, allowance) = futures::try_join!(
            self.chain.decimals(token),
            self.chain.allowance(token, owner, spender)
        )?;

        println!(
            "{} may spend {} on behalf of {}",
            display_address(spender),
            style(format_amount(allowance, decimals)).green(),
            display_address(owner)
        );

        Ok(())
    }

    /// Reads and prints the token's details. Doubles as the validity check
    /// for a token address: on failure the connected token is dropped.
    async fn load_details(&mut self, token: Address) -> Result<TokenDetails> {
        let holder = self.session.current().address();

        let details = self
            .with_spinner(
                "Reading token details...",
                token_details(&self.chain, token, holder),
            )
            .await;

        match details {
            Ok(details) => {
                println!("{}", details);
                Ok(details)
            }
            Err(err) => {
                self.session.disconnect_token();
                Err(err.into())
            }
        }
    }
}
