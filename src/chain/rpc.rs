/// alloy provider backed implementation of the chain traits
use super::{abi, ChainReader, ChainSigner, RouterAllowance, TxCall, TxReceipt};
use crate::errors::{ChainError, ChainResult};
use crate::logger::{self, LogTag};
use crate::utils::{short_address, short_hash};
use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

/// Reduce any provider/contract error to the chain error taxonomy
fn classify_error<E: std::fmt::Display>(error: E) -> ChainError {
    ChainError::from_message(error.to_string())
}

/// HTTP provider with a local signing key
pub struct AlloyChain {
    provider: DynProvider,
    address: Address,
}

impl AlloyChain {
    /// Connect to `rpc_url`, signing with the hex `private_key`
    pub async fn connect(rpc_url: &str, private_key: &str) -> ChainResult<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ChainError::Rpc(format!("Invalid private key: {}", e)))?;
        let address = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(rpc_url)
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to connect to {}: {}", rpc_url, e)))?
            .erased();

        logger::info(
            LogTag::Chain,
            &format!("Connected to {} as {}", rpc_url, short_address(&address)),
        );

        Ok(Self { provider, address })
    }

    pub async fn chain_id(&self) -> ChainResult<u64> {
        self.provider.get_chain_id().await.map_err(classify_error)
    }
}

#[async_trait]
impl ChainReader for AlloyChain {
    async fn balance_of(&self, token: Address, owner: Address) -> ChainResult<U256> {
        abi::IERC20::new(token, &self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(classify_error)
    }

    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ChainResult<U256> {
        abi::IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(classify_error)
    }

    async fn router_allowance(
        &self,
        transfer_proxy: Address,
        owner: Address,
        token: Address,
        spender: Address,
    ) -> ChainResult<RouterAllowance> {
        let result = abi::IAllowanceTransfer::new(transfer_proxy, &self.provider)
            .allowance(owner, token, spender)
            .call()
            .await
            .map_err(classify_error)?;

        Ok(RouterAllowance {
            amount: U256::from(result.amount),
            expiration: result.expiration.to::<u64>(),
        })
    }

    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        params: abi::QuoteExactSingleParams,
    ) -> ChainResult<U256> {
        let result = abi::IV4Quoter::new(quoter, &self.provider)
            .quoteExactInputSingle(params)
            .call()
            .await
            .map_err(classify_error)?;
        Ok(result.amountOut)
    }
}

#[async_trait]
impl ChainSigner for AlloyChain {
    fn address(&self) -> Address {
        self.address
    }

    async fn send(&self, call: TxCall) -> ChainResult<B256> {
        let request = TransactionRequest::default()
            .with_from(self.address)
            .with_to(call.to)
            .with_input(call.input);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(classify_error)?;
        let hash = *pending.tx_hash();

        logger::debug(
            LogTag::Chain,
            &format!("Broadcast {} to {}", short_hash(&hash), short_address(&call.to)),
        );
        Ok(hash)
    }

    async fn receipt(&self, hash: B256) -> ChainResult<Option<TxReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(classify_error)?;

        Ok(receipt.map(|r| TxReceipt {
            hash,
            block_number: r.block_number(),
            success: r.status(),
            gas_used: r.gas_used(),
        }))
    }
}
