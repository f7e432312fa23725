use console::style;
use tracing::{info, warn};

use super::{prompt::Field, Terminal};
use crate::{
    chain::TokenChain,
    error::{AppError, Result},
    terminal::prompt::Prompter,
    units::format_native,
    wallet::AccountWallet,
};

/// Typed at the switch prompt to create a new account instead.
const CREATE_NEW: &str = "n";

impl<C: TokenChain, P: Prompter> Terminal<C, P> {
    pub(super) async fn create_account(&mut self) -> Result<()> {
        let name = self.ask_account_name()?;
        let account = AccountWallet::generate(name)?;

        println!("New account: {}", style(account.checksum()).green());
        println!("Private key: {}", account.private_key());
        println!(
            "{}",
            style("Write the private key down now, it is not stored anywhere").yellow()
        );

        self.register_account(account).await
    }

    pub(super) async fn import_account(&mut self) -> Result<()> {
        let name = self.ask_account_name()?;
        let private_key = self.prompter.secret("Private key")?;
        let account = AccountWallet::from_private_key(name, &private_key)?;

        if let Some(known) = self
            .session
            .accounts()
            .iter()
            .find(|known| known.address() == account.address())
        {
            println!(
                "{}",
                style(format!("Same address as already known account '{}'", known.name())).yellow()
            );
        }

        println!("Imported account: {}", style(account.checksum()).green());

        self.register_account(account).await
    }

    pub(super) async fn switch_account(&mut self) -> Result<()> {
        self.print_accounts();

        let answer = self.ask(Field::new(format!(
            "Account number (or '{}' to create a new one)",
            CREATE_NEW
        )))?;

        if answer.eq_ignore_ascii_case(CREATE_NEW) {
            return self.create_account().await;
        }

        let index = answer
            .parse::<usize>()
            .ok()
            .and_then(|position| self.session.account_at(position))
            .map(|(index, _)| index)
            .ok_or_else(|| AppError::InvalidSelection(answer.clone()))?;

        self.switch_to(index).await
    }

    fn ask_account_name(&mut self) -> Result<String> {
        let default_name = format!("Account {}", self.session.accounts().len() + 1);

        self.ask_required(Field::new("Account name").with_default(default_name))
    }

    async fn register_account(&mut self, account: AccountWallet) -> Result<()> {
        info!(name = account.name(), address = %account.checksum(), "account added");

        let index = self.session.add_account(account);

        if self.prompter.confirm("Switch to this account now?", true)? {
            self.switch_to(index).await?;
        }

        Ok(())
    }

    /// Rebinds signing to the account at `index` and reports its balance.
    async fn switch_to(&mut self, index: usize) -> Result<()> {
        let account = self
            .session
            .accounts()
            .get(index)
            .ok_or_else(|| AppError::InvalidSelection((index + 1).to_string()))?;
        self.chain.bind_signer(account);

        let account = self.session.set_current(index)?;
        let address = account.address();

        info!(name = account.name(), address = %account.checksum(), "switched account");
        println!("Current account: {}", account);

        // the switch already happened, a failed balance read only warns
        match self.chain.native_balance(address).await {
            Ok(balance) => println!(
                "Balance: {} {}",
                format_native(balance),
                self.session.network().currency_symbol
            ),
            Err(err) => {
                warn!(error = %err, "could not read balance after switching");
                println!(
                    "{}",
                    style(format!("Could not read the balance: {}", err)).yellow()
                );
            }
        }

        Ok(())
    }

    fn print_accounts(&self) {
        println!("Accounts:");

        for (index, account) in self.session.accounts().iter().enumerate() {
            let marker = if index == self.session.current_index() {
                "*"
            } else {
                " "
            };
            println!("{} {}. {}", marker, index + 1, account);
        }
        println!();
    }
}
