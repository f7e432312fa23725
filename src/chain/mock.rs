use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};

use super::{ChainError, CreatedToken, TokenChain};
use crate::wallet::AccountWallet;

/// A state-changing call that reached the chain, with the signer that sent it.
/// Reverted calls are recorded too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    CreateToken {
        signer: Address,
        name: String,
        symbol: String,
        owner: Address,
    },
    Mint {
        signer: Address,
        token: Address,
        to: Address,
        amount: U256,
    },
    Burn {
        signer: Address,
        token: Address,
        amount: U256,
    },
    Transfer {
        signer: Address,
        token: Address,
        to: Address,
        amount: U256,
    },
    Approve {
        signer: Address,
        token: Address,
        spender: Address,
        amount: U256,
    },
    TransferFrom {
        signer: Address,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
}

#[derive(Debug, Clone)]
struct MockToken {
    name: String,
    symbol: String,
    decimals: u8,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl MockToken {
    fn total_supply(&self) -> U256 {
        self.balances
            .values()
            .fold(U256::zero(), |total, balance| total + *balance)
    }

    fn debit(&mut self, owner: Address, amount: U256) -> Result<(), ChainError> {
        let balance = self.balances.entry(owner).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or_else(|| ChainError::Contract("execution reverted: insufficient balance".into()))?;
        Ok(())
    }

    fn credit(&mut self, owner: Address, amount: U256) {
        *self.balances.entry(owner).or_default() += amount;
    }
}

#[derive(Debug, Default)]
struct MockState {
    tokens: HashMap<Address, MockToken>,
    native: HashMap<Address, U256>,
    next_created: Option<Address>,
    native_unreachable: bool,
    submitted: Vec<Submitted>,
}

/// In-memory chain: tokens that were never registered fail every read, the
/// way a call to a non-contract address does.
#[derive(Debug)]
pub struct MockChain {
    signer: Address,
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(signer: Address) -> Self {
        Self {
            signer,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_token(self, token: Address, name: &str, symbol: &str, decimals: u8) -> Self {
        self.state.lock().unwrap().tokens.insert(
            token,
            MockToken {
                name: name.to_owned(),
                symbol: symbol.to_owned(),
                decimals,
                balances: HashMap::new(),
                allowances: HashMap::new(),
            },
        );
        self
    }

    pub fn with_balance(self, token: Address, owner: Address, amount: U256) -> Self {
        if let Some(token) = self.state.lock().unwrap().tokens.get_mut(&token) {
            token.balances.insert(owner, amount);
        }
        self
    }

    pub fn with_allowance(
        self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Self {
        if let Some(token) = self.state.lock().unwrap().tokens.get_mut(&token) {
            token.allowances.insert((owner, spender), amount);
        }
        self
    }

    pub fn with_native_balance(self, owner: Address, amount: U256) -> Self {
        self.state.lock().unwrap().native.insert(owner, amount);
        self
    }

    /// The address the factory will report for the next `createToken`;
    /// `None` means the confirmation block carries no creation event.
    pub fn with_next_created(self, token: Option<Address>) -> Self {
        self.state.lock().unwrap().next_created = token;
        self
    }

    pub fn unreachable(self) -> Self {
        self.state.lock().unwrap().native_unreachable = true;
        self
    }

    pub fn forget_token(&self, token: Address) {
        self.state.lock().unwrap().tokens.remove(&token);
    }

    pub fn submitted(&self) -> Vec<Submitted> {
        self.state.lock().unwrap().submitted.clone()
    }

    fn read<T>(&self, token: Address, f: impl FnOnce(&MockToken) -> T) -> Result<T, ChainError> {
        let state = self.state.lock().unwrap();
        state
            .tokens
            .get(&token)
            .map(f)
            .ok_or_else(|| ChainError::Contract(format!("no contract code at {:?}", token)))
    }

    fn write(
        &self,
        token: Address,
        record: Submitted,
        f: impl FnOnce(&mut MockToken) -> Result<(), ChainError>,
    ) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock().unwrap();
        let contract = state
            .tokens
            .get_mut(&token)
            .ok_or_else(|| ChainError::Contract(format!("no contract code at {:?}", token)))?;

        // a reverted call is still mined, but none of its effects stick
        let mut next = contract.clone();
        let outcome = f(&mut next);
        if outcome.is_ok() {
            *contract = next;
        }

        state.submitted.push(record);
        outcome.map(|_| TxHash::random())
    }
}

#[async_trait]
impl TokenChain for MockChain {
    fn bind_signer(&mut self, account: &AccountWallet) {
        self.signer = account.address();
    }

    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        let state = self.state.lock().unwrap();
        if state.native_unreachable {
            return Err(ChainError::Contract("connection refused".into()));
        }
        Ok(state.native.get(&owner).copied().unwrap_or_default())
    }

    async fn name(&self, token: Address) -> Result<String, ChainError> {
        self.read(token, |t| t.name.clone())
    }

    async fn symbol(&self, token: Address) -> Result<String, ChainError> {
        self.read(token, |t| t.symbol.clone())
    }

    async fn decimals(&self, token: Address) -> Result<u8, ChainError> {
        self.read(token, |t| t.decimals)
    }

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError> {
        self.read(token, MockToken::total_supply)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        self.read(token, |t| t.balances.get(&owner).copied().unwrap_or_default())
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError> {
        self.read(token, |t| {
            t.allowances
                .get(&(owner, spender))
                .copied()
                .unwrap_or_default()
        })
    }

    async fn create_token(
        &self,
        name: &str,
        symbol: &str,
        owner: Address,
    ) -> Result<CreatedToken, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(Submitted::CreateToken {
            signer: self.signer,
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            owner,
        });

        let created = state.next_created.take();
        if let Some(address) = created {
            state.tokens.insert(
                address,
                MockToken {
                    name: name.to_owned(),
                    symbol: symbol.to_owned(),
                    decimals: 18,
                    balances: HashMap::new(),
                    allowances: HashMap::new(),
                },
            );
        }

        Ok(CreatedToken {
            tx_hash: TxHash::random(),
            token: created,
        })
    }

    async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<TxHash, ChainError> {
        let record = Submitted::Mint {
            signer: self.signer,
            token,
            to,
            amount,
        };
        self.write(token, record, |t| {
            t.credit(to, amount);
            Ok(())
        })
    }

    async fn burn(&self, token: Address, amount: U256) -> Result<TxHash, ChainError> {
        let signer = self.signer;
        let record = Submitted::Burn {
            signer,
            token,
            amount,
        };
        self.write(token, record, |t| t.debit(signer, amount))
    }

    async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        let signer = self.signer;
        let record = Submitted::Transfer {
            signer,
            token,
            to,
            amount,
        };
        self.write(token, record, |t| {
            t.debit(signer, amount)?;
            t.credit(to, amount);
            Ok(())
        })
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        let signer = self.signer;
        let record = Submitted::Approve {
            signer,
            token,
            spender,
            amount,
        };
        self.write(token, record, |t| {
            t.allowances.insert((signer, spender), amount);
            Ok(())
        })
    }

    async fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        let signer = self.signer;
        let record = Submitted::TransferFrom {
            signer,
            token,
            from,
            to,
            amount,
        };
        self.write(token, record, |t| {
            let remaining = t
                .allowances
                .get(&(from, signer))
                .copied()
                .unwrap_or_default()
                .checked_sub(amount)
                .ok_or_else(|| {
                    ChainError::Contract("execution reverted: insufficient allowance".into())
                })?;
            t.debit(from, amount)?;
            t.credit(to, amount);
            t.allowances.insert((from, signer), remaining);
            Ok(())
        })
    }
}
