//! Chain RPC boundary
//!
//! Everything the swap flow needs from a node is expressed through two traits:
//! [`ChainReader`] for read-only contract calls and [`ChainSigner`] for
//! submitting transactions from the connected account. [`AlloyChain`] backs
//! both with an alloy HTTP provider.

pub mod abi;
pub mod batch;
#[cfg(test)]
pub mod mock;
pub mod rpc;

pub use batch::{batch_read, BatchResult};
pub use rpc::AlloyChain;

use crate::errors::{ChainError, ChainResult};
use crate::logger::{self, LogTag};
use crate::utils::short_hash;
use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Permit2 allowance of an owner towards a spender for one token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouterAllowance {
    /// uint160 on chain
    pub amount: U256,
    /// Unix seconds; uint48 on chain
    pub expiration: u64,
}

/// A contract call to be signed and broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxCall {
    pub to: Address,
    pub input: Bytes,
}

impl TxCall {
    pub fn new(to: Address, input: impl Into<Bytes>) -> Self {
        Self {
            to,
            input: input.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub hash: B256,
    pub block_number: Option<u64>,
    /// Execution status; false means the transaction reverted
    pub success: bool,
    pub gas_used: u64,
}

/// Read-only contract queries
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// ERC-20 `balanceOf(owner)`
    async fn balance_of(&self, token: Address, owner: Address) -> ChainResult<U256>;

    /// ERC-20 `allowance(owner, spender)`
    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ChainResult<U256>;

    /// Permit2 `allowance(owner, token, spender)` read from `transfer_proxy`
    async fn router_allowance(
        &self,
        transfer_proxy: Address,
        owner: Address,
        token: Address,
        spender: Address,
    ) -> ChainResult<RouterAllowance>;

    /// V4 quoter `quoteExactInputSingle`, returning `amountOut`
    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        params: abi::QuoteExactSingleParams,
    ) -> ChainResult<U256>;
}

/// Transaction submission from the connected account
#[async_trait]
pub trait ChainSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and broadcast, returning the transaction hash
    async fn send(&self, call: TxCall) -> ChainResult<B256>;

    /// Receipt lookup; `None` while the transaction is pending
    async fn receipt(&self, hash: B256) -> ChainResult<Option<TxReceipt>>;
}

/// Poll until the chain reports an outcome for `hash`.
///
/// There is no deadline: a submitted transaction cannot be cancelled, so the
/// caller keeps waiting. Lookup errors are logged and retried.
pub async fn wait_for_receipt(
    signer: &dyn ChainSigner,
    hash: B256,
    poll_interval: Duration,
) -> ChainResult<TxReceipt> {
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        match signer.receipt(hash).await {
            Ok(Some(receipt)) => {
                logger::debug(
                    LogTag::Chain,
                    &format!(
                        "Receipt for {} after {} lookups: success={} block={:?}",
                        short_hash(&hash),
                        attempts,
                        receipt.success,
                        receipt.block_number
                    ),
                );
                return Ok(receipt);
            }
            Ok(None) => {
                if attempts % 10 == 0 {
                    logger::verbose(
                        LogTag::Chain,
                        &format!("Still waiting for {} ({} lookups)", short_hash(&hash), attempts),
                    );
                }
            }
            Err(ChainError::UserRejected(message)) => {
                return Err(ChainError::UserRejected(message));
            }
            Err(e) => {
                logger::warning(
                    LogTag::Chain,
                    &format!("Receipt lookup for {} failed, retrying: {}", short_hash(&hash), e),
                );
            }
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Submit `call` and block until its receipt is observed. A reverted receipt
/// is reported as [`ChainError::Reverted`].
pub async fn send_and_confirm(
    signer: &dyn ChainSigner,
    call: TxCall,
    poll_interval: Duration,
) -> ChainResult<TxReceipt> {
    let hash = signer.send(call).await?;
    let receipt = wait_for_receipt(signer, hash, poll_interval).await?;
    if receipt.success {
        Ok(receipt)
    } else {
        Err(ChainError::Reverted(format!(
            "transaction {} reverted",
            hash
        )))
    }
}
