use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    contract::{builders::ContractCall, ContractError},
    prelude::SignerMiddleware,
    providers::{Http, JsonRpcClient, Middleware, Provider, ProviderError},
    signers::{LocalWallet, Signer},
    types::{Address, TransactionReceipt, TxHash, U256, U64},
};
use tracing::{debug, info};

use super::{ChainError, CreatedToken, TokenChain};
use crate::{
    abis::{FactoryToken, TokenFactory},
    network::Network,
    wallet::AccountWallet,
};

type SignerClient<P> = SignerMiddleware<Provider<P>, LocalWallet>;

/// Chain access over JSON-RPC. Reads go through the bare provider,
/// writes through a signer middleware bound to the current account.
pub struct EthersChain<P = Http> {
    provider: Arc<Provider<P>>,
    client: Arc<SignerClient<P>>,
    factory: Address,
    chain_id: u64,
    confirmation_timeout: Duration,
}

fn contract_error<M: Middleware>(err: ContractError<M>) -> ChainError {
    ChainError::Contract(err.to_string())
}

impl EthersChain<Http> {
    pub fn connect(network: &Network, account: &AccountWallet) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(network.rpc_url.as_str()).map_err(|err| {
            ChainError::InvalidRpcUrl {
                url: network.rpc_url.to_owned(),
                reason: err.to_string(),
            }
        })?;

        Ok(Self::with_provider(provider, network, account))
    }
}

impl<P: JsonRpcClient + Clone + 'static> EthersChain<P> {
    pub fn with_provider(provider: Provider<P>, network: &Network, account: &AccountWallet) -> Self {
        let client = Arc::new(Self::signer_client(&provider, account, network.chain_id));

        Self {
            provider: Arc::new(provider),
            client,
            factory: network.factory,
            chain_id: network.chain_id,
            confirmation_timeout: network.confirmation_timeout,
        }
    }

    fn signer_client(
        provider: &Provider<P>,
        account: &AccountWallet,
        chain_id: u64,
    ) -> SignerClient<P> {
        let wallet = account.wallet().clone().with_chain_id(chain_id);

        SignerMiddleware::new(provider.clone(), wallet)
    }

    fn reader(&self, token: Address) -> FactoryToken<Provider<P>> {
        FactoryToken::new(token, self.provider.clone())
    }

    fn writer(&self, token: Address) -> FactoryToken<SignerClient<P>> {
        FactoryToken::new(token, self.client.clone())
    }

    /// Sends the call and waits for it to be mined, bounded by the
    /// configured confirmation timeout.
    async fn confirm<D>(
        &self,
        call: ContractCall<SignerClient<P>, D>,
    ) -> Result<TransactionReceipt, ChainError>
    where
        D: Detokenize + Send + Sync,
    {
        let pending_tx = call.send().await.map_err(contract_error)?;
        let tx_hash = *pending_tx;

        info!(tx = ?tx_hash, "transaction submitted");

        let receipt = await_receipt(tx_hash, self.confirmation_timeout, pending_tx).await?;

        debug!(tx = ?tx_hash, block = ?receipt.block_number, "transaction confirmed");

        Ok(receipt)
    }

    async fn submit<D>(&self, call: ContractCall<SignerClient<P>, D>) -> Result<TxHash, ChainError>
    where
        D: Detokenize + Send + Sync,
    {
        let receipt = self.confirm(call).await?;

        Ok(receipt.transaction_hash)
    }

    /// First token the factory announced in `block`, if any.
    async fn created_in_block(&self, block: U64) -> Result<Option<Address>, ChainError> {
        // the event filter is already scoped to the factory's address
        let events = TokenFactory::new(self.factory, self.provider.clone())
            .token_created_filter()
            .from_block(block)
            .to_block(block)
            .query()
            .await
            .map_err(contract_error)?;

        debug!(?block, matches = events.len(), "scanned block for creation events");

        Ok(events.first().map(|event| event.token_address))
    }
}

/// Waits on a pending transaction for at most `timeout`.
async fn await_receipt<F>(
    tx_hash: TxHash,
    timeout: Duration,
    pending: F,
) -> Result<TransactionReceipt, ChainError>
where
    F: Future<Output = Result<Option<TransactionReceipt>, ProviderError>>,
{
    let receipt = tokio::time::timeout(timeout, pending)
        .await
        .map_err(|_| ChainError::ConfirmationTimeout(tx_hash, timeout))??;

    settle(tx_hash, receipt)
}

/// A missing receipt means the node dropped the transaction; status 0 means
/// it was mined but reverted.
fn settle(
    tx_hash: TxHash,
    receipt: Option<TransactionReceipt>,
) -> Result<TransactionReceipt, ChainError> {
    let receipt = receipt.ok_or(ChainError::Dropped(tx_hash))?;

    if receipt.status == Some(U64::zero()) {
        return Err(ChainError::Reverted(tx_hash));
    }

    Ok(receipt)
}

#[async_trait]
impl<P: JsonRpcClient + Clone + 'static> TokenChain for EthersChain<P> {
    fn bind_signer(&mut self, account: &AccountWallet) {
        self.client = Arc::new(Self::signer_client(&self.provider, account, self.chain_id));
    }

    fn signer_address(&self) -> Address {
        self.client.address()
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        Ok(self.provider.get_balance(owner, None).await?)
    }

    async fn name(&self, token: Address) -> Result<String, ChainError> {
        self.reader(token).name().call().await.map_err(contract_error)
    }

    async fn symbol(&self, token: Address) -> Result<String, ChainError> {
        self.reader(token).symbol().call().await.map_err(contract_error)
    }

    async fn decimals(&self, token: Address) -> Result<u8, ChainError> {
        self.reader(token).decimals().call().await.map_err(contract_error)
    }

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError> {
        self.reader(token)
            .total_supply()
            .call()
            .await
            .map_err(contract_error)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        self.reader(token)
            .balance_of(owner)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError> {
        self.reader(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn create_token(
        &self,
        name: &str,
        symbol: &str,
        owner: Address,
    ) -> Result<CreatedToken, ChainError> {
        let factory = TokenFactory::new(self.factory, self.client.clone());

        let call = factory.create_token(name.to_owned(), symbol.to_owned(), owner);
        let receipt = self.confirm(call).await?;
        let tx_hash = receipt.transaction_hash;
        let block = receipt
            .block_number
            .ok_or(ChainError::MissingBlock(tx_hash))?;

        Ok(CreatedToken {
            tx_hash,
            token: self.created_in_block(block).await?,
        })
    }

    async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.submit(self.writer(token).mint(to, amount)).await
    }

    async fn burn(&self, token: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.submit(self.writer(token).burn(amount)).await
    }

    async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        self.submit(self.writer(token).transfer(to, amount)).await
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        self.submit(self.writer(token).approve(spender, amount))
            .await
    }

    async fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        self.submit(self.writer(token).transfer_from(from, to, amount))
            .await
    }
}
