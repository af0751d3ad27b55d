/// In-memory chain used by tests
///
/// Submitted calldata is decoded so approvals take effect the way they would
/// on chain; router executions are only recorded.
use super::{abi, ChainReader, ChainSigner, RouterAllowance, TxCall, TxReceipt};
use crate::errors::{ChainError, ChainResult};
use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
struct MockState {
    balances: HashMap<(Address, Address), U256>,
    token_allowances: HashMap<(Address, Address, Address), U256>,
    router_allowances: HashMap<(Address, Address, Address), RouterAllowance>,
    quote: Option<U256>,
    quote_error: Option<String>,
    quote_requests: Vec<abi::QuoteExactSingleParams>,
    send_error: Option<String>,
    reverting_targets: HashSet<Address>,
    sent: Vec<TxCall>,
    receipts: HashMap<B256, TxReceipt>,
    pending_lookups: u32,
    failing_balance_tokens: HashSet<Address>,
}

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

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state.lock().balances.insert((token, owner), amount);
    }

    pub fn set_token_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state
            .lock()
            .token_allowances
            .insert((token, owner, spender), amount);
    }

    pub fn set_router_allowance(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
        allowance: RouterAllowance,
    ) {
        self.state
            .lock()
            .router_allowances
            .insert((owner, token, spender), allowance);
    }

    pub fn set_quote(&self, amount_out: U256) {
        let mut state = self.state.lock();
        state.quote = Some(amount_out);
        state.quote_error = None;
    }

    pub fn fail_quotes(&self, message: &str) {
        self.state.lock().quote_error = Some(message.to_string());
    }

    /// Every subsequent `send` fails with `message`
    pub fn fail_sends(&self, message: &str) {
        self.state.lock().send_error = Some(message.to_string());
    }

    /// Transactions sent to `target` are mined but revert
    pub fn revert_calls_to(&self, target: Address) {
        self.state.lock().reverting_targets.insert(target);
    }

    /// The next `count` receipt lookups report the transaction as pending
    pub fn delay_receipts(&self, count: u32) {
        self.state.lock().pending_lookups = count;
    }

    pub fn fail_balance_reads(&self, token: Address) {
        self.state.lock().failing_balance_tokens.insert(token);
    }

    pub fn sent(&self) -> Vec<TxCall> {
        self.state.lock().sent.clone()
    }

    pub fn quote_requests(&self) -> Vec<abi::QuoteExactSingleParams> {
        self.state.lock().quote_requests.clone()
    }

    fn apply(state: &mut MockState, owner: Address, call: &TxCall) {
        let input = call.input.as_ref();
        if input.starts_with(&abi::IERC20::approveCall::SELECTOR) {
            if let Ok(approve) = abi::IERC20::approveCall::abi_decode(input) {
                state
                    .token_allowances
                    .insert((call.to, owner, approve.spender), approve.amount);
            }
        } else if input.starts_with(&abi::IAllowanceTransfer::approveCall::SELECTOR) {
            if let Ok(approve) = abi::IAllowanceTransfer::approveCall::abi_decode(input) {
                state.router_allowances.insert(
                    (owner, approve.token, approve.spender),
                    RouterAllowance {
                        amount: U256::from(approve.amount),
                        expiration: approve.expiration.to::<u64>(),
                    },
                );
            }
        }
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn balance_of(&self, token: Address, owner: Address) -> ChainResult<U256> {
        let state = self.state.lock();
        if state.failing_balance_tokens.contains(&token) {
            return Err(ChainError::Rpc(format!("balanceOf on {} timed out", token)));
        }
        Ok(state.balances.get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ChainResult<U256> {
        Ok(self
            .state
            .lock()
            .token_allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn router_allowance(
        &self,
        _transfer_proxy: Address,
        owner: Address,
        token: Address,
        spender: Address,
    ) -> ChainResult<RouterAllowance> {
        Ok(self
            .state
            .lock()
            .router_allowances
            .get(&(owner, token, spender))
            .copied()
            .unwrap_or(RouterAllowance {
                amount: U256::ZERO,
                expiration: 0,
            }))
    }

    async fn quote_exact_input_single(
        &self,
        _quoter: Address,
        params: abi::QuoteExactSingleParams,
    ) -> ChainResult<U256> {
        let mut state = self.state.lock();
        state.quote_requests.push(params);
        if let Some(message) = &state.quote_error {
            return Err(ChainError::from_message(message.clone()));
        }
        state
            .quote
            .ok_or_else(|| ChainError::Reverted("execution reverted: no liquidity".into()))
    }
}

#[async_trait]
impl ChainSigner for MockChain {
    fn address(&self) -> Address {
        self.signer
    }

    async fn send(&self, call: TxCall) -> ChainResult<B256> {
        let mut state = self.state.lock();
        if let Some(message) = &state.send_error {
            return Err(ChainError::from_message(message.clone()));
        }

        let nonce = state.sent.len() as u64;
        let hash = keccak256(nonce.to_be_bytes());
        let success = !state.reverting_targets.contains(&call.to);
        if success {
            Self::apply(&mut state, self.signer, &call);
        }

        state.receipts.insert(
            hash,
            TxReceipt {
                hash,
                block_number: Some(1_000 + nonce),
                success,
                gas_used: 21_000,
            },
        );
        state.sent.push(call);
        Ok(hash)
    }

    async fn receipt(&self, hash: B256) -> ChainResult<Option<TxReceipt>> {
        let mut state = self.state.lock();
        if state.pending_lookups > 0 {
            state.pending_lookups -= 1;
            return Ok(None);
        }
        Ok(state.receipts.get(&hash).copied())
    }
}
