use std::{
    future::Future,
    io::{self, stdout},
};

use console::style;
use crossterm::execute;
use ethers::types::{Address, U256};
use spinners::{Spinner, Spinners};
use tracing::{debug, info, warn};

use crate::{
    chain::{ChainError, TokenChain},
    cli::Args,
    error::{AppError, Result},
    network::Network,
    session::Session,
    units::{format_native, to_base_units},
    wallet::{display_address, parse_address, AccountWallet},
};

use menu::{Command, MenuChoice};
use prompt::{Field, Prompter};

mod account;
pub mod menu;
pub mod prompt;
mod token;
mod transfer;

/// Outcome of handling one line typed at the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The main menu loop. Owns the session, the chain access bound to the
/// current account, and the prompter that asks the operator for input.
pub struct Terminal<C, P> {
    session: Session,
    chain: C,
    prompter: P,
}

impl<C: TokenChain, P: Prompter> Terminal<C, P> {
    pub fn new(session: Session, chain: C, prompter: P) -> Self {
        Self {
            session,
            chain,
            prompter,
        }
    }

    /// Resolves connection parameters, binds the primary account and checks
    /// that the chain answers. Any error here leaves no usable session.
    pub async fn bootstrap<F>(args: &Args, mut prompter: P, connect: F) -> Result<Self>
    where
        F: FnOnce(&Network, &AccountWallet) -> std::result::Result<C, ChainError>,
    {
        let (network, private_key) = Network::resolve(args, &mut prompter)?;
        let primary = AccountWallet::from_private_key("Primary", &private_key)?;
        let chain = connect(&network, &primary)?;

        let balance = chain.native_balance(primary.address()).await?;

        info!(account = %primary.checksum(), %network, "session started");

        println!("Connected to {}", network);
        println!(
            "Primary account {} holds {} {}",
            primary.checksum(),
            format_native(balance),
            network.currency_symbol
        );

        Ok(Self::new(Session::new(network, primary), chain, prompter))
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            self.render();

            let input = match self.prompter.text(&Field::new("Select an option")) {
                Ok(input) => input,
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    info!("input closed, leaving");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

            if self.handle(&input).await == Flow::Exit {
                println!("Bye!");
                return Ok(());
            }

            self.prompter.pause()?;
        }
    }

    /// Routes one menu selection. Operation failures are reported here and
    /// never leave the loop.
    pub async fn handle(&mut self, input: &str) -> Flow {
        match MenuChoice::parse(input) {
            MenuChoice::Command(Command::Exit) => Flow::Exit,
            MenuChoice::Command(command) => {
                self.dispatch(command).await;
                Flow::Continue
            }
            MenuChoice::Unrecognized(raw) => {
                debug!(input = %raw, "unrecognized menu choice");
                println!("{}", style(format!("Invalid choice '{}'", raw)).red());
                Flow::Continue
            }
        }
    }

    async fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatching");

        let result = match command {
            Command::CreateToken => self.create_token().await,
            Command::ConnectToken => self.connect_token().await,
            Command::TokenDetails => self.token_details().await,
            Command::CheckBalance => self.check_balance().await,
            Command::Mint => self.mint().await,
            Command::Burn => self.burn().await,
            Command::Transfer => self.transfer().await,
            Command::Approve => self.approve().await,
            Command::TransferFrom => self.transfer_from().await,
            Command::CheckAllowance => self.check_allowance().await,
            Command::CreateAccount => self.create_account().await,
            Command::ImportAccount => self.import_account().await,
            Command::SwitchAccount => self.switch_account().await,
            Command::Exit => Ok(()),
        };

        if let Err(err) = result {
            warn!(?command, error = %err, "operation failed");
            println!(
                "{}",
                style(format!("{} failed: {}", command.label(), err)).red()
            );
        }
    }

    fn render(&self) {
        if self.prompter.is_interactive() {
            if let Err(err) = Self::clear_terminal() {
                debug!(error = %err, "could not clear terminal");
            }
        }

        self.settings_bar();

        for command in Command::MENU {
            println!("{:>3}. {}", command.number(), command.label());
        }
        println!();
    }

    fn settings_bar(&self) {
        let current = self.session.current();
        let network = self.session.network();
        let token = self
            .session
            .token()
            .map(display_address)
            .unwrap_or_else(|| "None".to_owned());

        println!("Token Factory CLI v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!(
            "Account: {} ({}) \t Chain id: {} \t RPC URL: {}",
            current.name(),
            current.checksum(),
            network.chain_id,
            network.rpc_url
        );
        println!("Token Factory: {}", display_address(network.factory));
        println!("Connected token: {}", style(token).cyan());
        println!();
    }

    fn clear_terminal() -> io::Result<()> {
        execute!(
            stdout(),
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
        )?;
        execute!(stdout(), crossterm::cursor::MoveTo(0, 0))
    }

    /// Runs `fut` behind a spinner when a terminal is attached.
    async fn with_spinner<T>(&self, message: &str, fut: impl Future<Output = T>) -> T {
        let spinner = self
            .prompter
            .is_interactive()
            .then(|| Spinner::new(Spinners::Aesthetic, message.to_owned()));

        let output = fut.await;

        if let Some(mut spinner) = spinner {
            spinner.stop_with_newline();
        }

        output
    }

    fn ask(&mut self, field: Field) -> Result<String> {
        Ok(self.prompter.text(&field)?.trim().to_owned())
    }

    fn ask_required(&mut self, field: Field) -> Result<String> {
        let answer = self.ask(field.clone())?;

        if answer.is_empty() {
            return Err(AppError::EmptyField(field.label().to_owned()));
        }

        Ok(answer)
    }

    fn ask_address(&mut self, field: Field) -> Result<Address> {
        let answer = self.ask_required(field)?;

        Ok(parse_address(&answer)?)
    }

    /// Field defaulting to the current account's address.
    fn own_address_field(&self, label: &str) -> Field {
        Field::new(label).with_default(self.session.current().checksum())
    }

    /// Reads the token's precision and scales `amount` into smallest units.
    async fn scale_amount(&self, token: Address, amount: &str) -> Result<(U256, u8)> {
        let decimals = self.chain.decimals(token).await?;
        let scaled = to_base_units(amount, decimals)?;

        debug!(%amount, decimals, %scaled, "scaled amount");

        Ok((scaled, decimals))
    }
}
