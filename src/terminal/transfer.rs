use console::style;
use ethers::types::TxHash;
use tracing::info;

use super::{prompt::Field, Terminal};
use crate::{
    chain::TokenChain,
    error::{AppError, Result},
    terminal::prompt::Prompter,
    units::format_amount,
    wallet::display_address,
};

impl<C: TokenChain, P: Prompter> Terminal<C, P> {
    pub(super) async fn mint(&mut self) -> Result<()> {
        let token = self.session.require_token()?;
        let recipient_field = self.own_address_field("Recipient address");
        let to = self.ask_address(recipient_field)?;
        let amount = self.ask_required(Field::new("Amount to mint"))?;

        let (amount, decimals) = self.scale_amount(token, &amount).await?;

        let tx_hash = self
            .with_spinner("Minting...", self.chain.mint(token, to, amount))
            .await?;
        self.report_tx("mint", tx_hash);

        let balance = self.chain.balance_of(token, to).await?;
        println!(
            "Balance of {}: {}",
            display_address(to),
            format_amount(balance, decimals)
        );

        Ok(())
    }

    pub(super) async fn burn(&mut self) -> Result<()> {
        let token = self.session.require_token()?;
        let me = self.session.current().address();
        let amount = self.ask_required(Field::new("Amount to burn"))?;

        let (amount, decimals) = self.scale_amount(token, &amount).await?;

        let tx_hash = self
            .with_spinner("Burning...", self.chain.burn(token, amount))
            .await?;
        self.report_tx("burn", tx_hash);

        let (balance, total_supply) = futures::try_join!(
            self.chain.balance_of(token, me),
            self.chain.total_supply(token)
        )?;
        println!("Your balance: {}", format_amount(balance, decimals));
        println!("Total supply: {}", format_amount(total_supply, decimals));

        Ok(())
    }

    pub(super) async fn transfer(&mut self) -> Result<()> {
        let token = self.session.require_token()?;
        let me = self.session.current().address();
        let to = self.ask_address(Field::new("Recipient address"))?;
        let amount = self.ask_required(Field::new("Amount to transfer"))?;

        let (amount, decimals) = self.scale_amount(token, &amount).await?;

        let tx_hash = self
            .with_spinner("Transferring...", self.chain.transfer(token, to, amount))
            .await?;
        self.report_tx("transfer", tx_hash);

        let (own, theirs) = futures::try_join!(
            self.chain.balance_of(token, me),
            self.chain.balance_of(token, to)
        )?;
        println!("Your balance: {}", format_amount(own, decimals));
        println!(
            "Balance of {}: {}",
            display_address(to),
            format_amount(theirs, decimals)
        );

        Ok(())
    }

    pub(super) async fn approve(&mut self) -> Result<()> {
        let token = self.session.require_token()?;
        let me = self.session.current().address();
        let spender = self.ask_address(Field::new("Spender address"))?;
        let amount = self.ask_required(Field::new("Amount to approve"))?;

        let (amount, decimals) = self.scale_amount(token, &amount).await?;

        let tx_hash = self
            .with_spinner("Approving...", self.chain.approve(token, spender, amount))
            .await?;
        self.report_tx("approve", tx_hash);

        let allowance = self.chain.allowance(token, me, spender).await?;
        println!(
            "{} may now spend {} of your tokens",
            display_address(spender),
            format_amount(allowance, decimals)
        );

        Ok(())
    }

    /// Moves tokens out of another account using the allowance it granted to
    /// the current account, which always acts as the spender.
    pub(super) async fn transfer_from(&mut self) -> Result<()> {
        let token = self.session.require_token()?;
        let me = self.session.current().address();
        let from = self.ask_address(Field::new("Owner address (tokens are taken from)"))?;
        let recipient_field = self.own_address_field("Recipient address");
        let to = self.ask_address(recipient_field)?;
        let amount = self.ask_required(Field::new("Amount to transfer"))?;

        let (amount, decimals) = self.scale_amount(token, &amount).await?;

        let allowance = self.chain.allowance(token, from, me).await?;
        if allowance < amount {
            return Err(AppError::InsufficientAllowance {
                requested: format_amount(amount, decimals),
                approved: format_amount(allowance, decimals),
                shortfall: format_amount(amount - allowance, decimals),
            });
        }

        let tx_hash = self
            .with_spinner(
                "Transferring...",
                self.chain.transfer_from(token, from, to, amount),
            )
            .await?;
        self.report_tx("transferFrom", tx_hash);

        let (from_balance, to_balance, remaining) = futures::try_join!(
            self.chain.balance_of(token, from),
            self.chain.balance_of(token, to),
            self.chain.allowance(token, from, me)
        )?;
        println!(
            "Balance of {}: {}",
            display_address(from),
            format_amount(from_balance, decimals)
        );
        println!(
            "Balance of {}: {}",
            display_address(to),
            format_amount(to_balance, decimals)
        );
        println!("Remaining allowance: {}", format_amount(remaining, decimals));

        Ok(())
    }

    fn report_tx(&self, action: &str, tx_hash: TxHash) {
        info!(action, tx = ?tx_hash, signer = %self.session.current().checksum(), "transaction confirmed");
        println!("TX Hash: {:?}", tx_hash);
        println!("{}", style(format!("Successful {}!", action)).green());
    }
}

#[cfg(test)]
mod tests {
    use ethers::types::{Address, U256};

    use crate::chain::mock::{MockChain, Submitted};
    use crate::chain::TokenChain;
    use crate::error::AppError;
    use crate::terminal::{testing::terminal, Flow};

    fn tokens(amount: u64) -> U256 {
        U256::from(amount) * U256::exp10(18)
    }

    fn connected<I, S>(
        setup: impl FnOnce(Address, Address) -> MockChain,
        answers: I,
    ) -> (
        crate::terminal::Terminal<MockChain, crate::terminal::prompt::ScriptedPrompter>,
        Address,
        Address,
    )
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let token = Address::random();
        let mut terminal = terminal(|me| setup(me, token), answers);
        terminal.session.connect_token(token);
        let me = terminal.session().current().address();
        (terminal, token, me)
    }

    #[tokio::test]
    async fn mint_defaults_recipient_to_current_account() {
        let (mut terminal, token, me) = connected(
            |me, token| MockChain::new(me).with_token(token, "Gold", "GLD", 18),
            ["", "10"],
        );

        terminal.mint().await.unwrap();

        assert_eq!(
            terminal.chain().submitted(),
            vec![Submitted::Mint {
                signer: me,
                token,
                to: me,
                amount: tokens(10),
            }]
        );
    }

    #[tokio::test]
    async fn mint_uses_token_precision() {
        let other = Address::random();
        let (mut terminal, _, _) = connected(
            |me, token| MockChain::new(me).with_token(token, "Cents", "CT", 2),
            [format!("{:?}", other), "1.239".to_owned()],
        );

        terminal.mint().await.unwrap();

        assert!(matches!(
            terminal.chain().submitted()[0],
            Submitted::Mint { to, amount, .. } if to == other && amount == U256::from(124u64)
        ));
    }

    #[tokio::test]
    async fn non_numeric_amount_submits_nothing() {
        let (mut terminal, _, _) = connected(
            |me, token| MockChain::new(me).with_token(token, "Gold", "GLD", 18),
            ["", "lots"],
        );

        let result = terminal.mint().await;

        assert!(matches!(result, Err(AppError::Amount(_))));
        assert!(terminal.chain().submitted().is_empty());
    }

    #[tokio::test]
    async fn malformed_recipient_submits_nothing() {
        let (mut terminal, _, _) = connected(
            |me, token| MockChain::new(me).with_token(token, "Gold", "GLD", 18),
            ["0x123", "1"],
        );

        assert!(matches!(terminal.transfer().await, Err(AppError::Wallet(_))));
        assert!(terminal.chain().submitted().is_empty());
    }

    #[tokio::test]
    async fn burn_reduces_own_balance() {
        let (mut terminal, token, me) = connected(
            |me, token| {
                MockChain::new(me)
                    .with_token(token, "Gold", "GLD", 18)
                    .with_balance(token, me, tokens(5))
            },
            ["2"],
        );

        terminal.burn().await.unwrap();

        assert_eq!(
            terminal.chain().submitted(),
            vec![Submitted::Burn {
                signer: me,
                token,
                amount: tokens(2),
            }]
        );
    }

    #[tokio::test]
    async fn reverted_transfer_is_reported_not_fatal() {
        let recipient = Address::random();
        let (mut terminal, token, _) = connected(
            |me, token| MockChain::new(me).with_token(token, "Gold", "GLD", 18),
            [format!("{:?}", recipient), "1".to_owned()],
        );

        // nothing to transfer, the chain reverts
        assert_eq!(terminal.handle("7").await, Flow::Continue);
        assert_eq!(terminal.chain().submitted().len(), 1);
        assert_eq!(
            terminal.chain().balance_of(token, recipient).await.unwrap(),
            U256::zero()
        );
    }

    #[tokio::test]
    async fn approve_sets_allowance_for_spender() {
        let spender = Address::random();
        let (mut terminal, token, me) = connected(
            |me, token| MockChain::new(me).with_token(token, "Gold", "GLD", 18),
            [format!("{:?}", spender), "3.5".to_owned()],
        );

        terminal.approve().await.unwrap();

        assert_eq!(
            terminal.chain().submitted(),
            vec![Submitted::Approve {
                signer: me,
                token,
                spender,
                amount: U256::from(35u64) * U256::exp10(17),
            }]
        );
    }

    #[tokio::test]
    async fn transfer_from_aborts_when_allowance_is_short() {
        let owner = Address::random();
        let (mut terminal, _, _) = connected(
            |me, token| {
                MockChain::new(me)
                    .with_token(token, "Gold", "GLD", 18)
                    .with_balance(token, owner, tokens(100))
                    .with_allowance(token, owner, me, tokens(3))
            },
            [format!("{:?}", owner), String::new(), "5".to_owned()],
        );

        let result = terminal.transfer_from().await;

        match result {
            Err(AppError::InsufficientAllowance {
                requested,
                approved,
                shortfall,
            }) => {
                assert_eq!(requested, "5");
                assert_eq!(approved, "3");
                assert_eq!(shortfall, "2");
            }
            other => panic!("expected insufficient allowance, got {:?}", other),
        }
        assert!(terminal.chain().submitted().is_empty());
    }

    #[tokio::test]
    async fn transfer_from_never_submits_above_allowance() {
        let cases = [(0u64, 1u64), (3, 5), (9, 10), (1, 1_000)];

        for (allowance, amount) in cases {
            let owner = Address::random();
            let (mut terminal, _, _) = connected(
                |me, token| {
                    MockChain::new(me)
                        .with_token(token, "Gold", "GLD", 0)
                        .with_balance(token, owner, U256::from(10_000u64))
                        .with_allowance(token, owner, me, U256::from(allowance))
                },
                [format!("{:?}", owner), String::new(), amount.to_string()],
            );

            assert!(terminal.transfer_from().await.is_err());
            assert!(
                terminal.chain().submitted().is_empty(),
                "submitted with allowance {} and amount {}",
                allowance,
                amount
            );
        }
    }

    #[tokio::test]
    async fn transfer_from_within_allowance_submits() {
        let owner = Address::random();
        let recipient = Address::random();
        let (mut terminal, token, me) = connected(
            |me, token| {
                MockChain::new(me)
                    .with_token(token, "Gold", "GLD", 18)
                    .with_balance(token, owner, tokens(10))
                    .with_allowance(token, owner, me, tokens(5))
            },
            [
                format!("{:?}", owner),
                format!("{:?}", recipient),
                "5".to_owned(),
            ],
        );

        terminal.transfer_from().await.unwrap();

        assert_eq!(
            terminal.chain().submitted(),
            vec![Submitted::TransferFrom {
                signer: me,
                token,
                from: owner,
                to: recipient,
                amount: tokens(5),
            }]
        );
    }

    #[tokio::test]
    async fn writes_need_a_token_and_ask_nothing() {
        let mut terminal = terminal(|me| MockChain::new(me), Vec::<String>::new());

        assert!(matches!(terminal.mint().await, Err(AppError::NoTokenConnected)));
        assert!(matches!(terminal.burn().await, Err(AppError::NoTokenConnected)));
        assert!(matches!(terminal.transfer().await, Err(AppError::NoTokenConnected)));
        assert!(matches!(terminal.approve().await, Err(AppError::NoTokenConnected)));
        assert!(matches!(
            terminal.transfer_from().await,
            Err(AppError::NoTokenConnected)
        ));
        assert!(terminal.prompter.asked.is_empty());
    }
}
