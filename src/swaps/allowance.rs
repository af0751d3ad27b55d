/// Spending authorizations for the swap input token
///
/// Two layers must be in place before the router can pull tokens:
/// 1. ERC-20 allowance owner -> transfer proxy (Permit2)
/// 2. Permit2 allowance owner -> router, with an expiration
use super::config::{ROUTER_ALLOWANCE_EXPIRY_BUFFER_SECS, ROUTER_ALLOWANCE_LIFETIME_SECS};
use crate::chain::{abi, send_and_confirm, ChainReader, ChainSigner, RouterAllowance, TxCall, TxReceipt};
use crate::config::ContractsConfig;
use crate::errors::ChainResult;
use crate::logger::{self, LogTag};
use crate::utils::short_hash;
use alloy::primitives::aliases::{U160, U48};
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// An approval transaction the swap depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApprovalStep {
    /// ERC-20 approve(transfer proxy, max)
    TransferProxy,
    /// Permit2 approve(token, router, max uint160, now + one year)
    RouterAllowance,
}

/// Approval decision over freshly read allowance records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApprovalPlan {
    pub token_allowance: U256,
    pub router_allowance: RouterAllowance,
    pub transfer_proxy_required: bool,
    pub router_required: bool,
}

impl ApprovalPlan {
    /// Steps in submission order, transfer proxy first
    pub fn required(&self) -> Vec<ApprovalStep> {
        let mut steps = Vec::new();
        if self.transfer_proxy_required {
            steps.push(ApprovalStep::TransferProxy);
        }
        if self.router_required {
            steps.push(ApprovalStep::RouterAllowance);
        }
        steps
    }

    pub fn is_ready(&self) -> bool {
        !self.transfer_proxy_required && !self.router_required
    }
}

pub fn transfer_proxy_approval_required(allowance: U256, amount_in: U256) -> bool {
    allowance < amount_in
}

/// Renew when the amount is short or the allowance expires within the buffer
pub fn router_approval_required(allowance: &RouterAllowance, amount_in: U256, now: u64) -> bool {
    allowance.amount < amount_in
        || allowance.expiration < now.saturating_add(ROUTER_ALLOWANCE_EXPIRY_BUFFER_SECS)
}

pub struct AllowanceManager {
    reader: Arc<dyn ChainReader>,
    signer: Arc<dyn ChainSigner>,
    transfer_proxy: Address,
    router: Address,
    poll_interval: Duration,
}

impl AllowanceManager {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        signer: Arc<dyn ChainSigner>,
        contracts: &ContractsConfig,
        poll_interval: Duration,
    ) -> Self {
        Self {
            reader,
            signer,
            transfer_proxy: contracts.transfer_proxy,
            router: contracts.router,
            poll_interval,
        }
    }

    pub fn router(&self) -> Address {
        self.router
    }

    pub async fn check_transfer_proxy_allowance(
        &self,
        owner: Address,
        token: Address,
    ) -> ChainResult<U256> {
        let allowance = self
            .reader
            .token_allowance(token, owner, self.transfer_proxy)
            .await?;
        logger::debug(
            LogTag::Allowance,
            &format!("Transfer proxy allowance: {}", allowance),
        );
        Ok(allowance)
    }

    pub async fn check_router_allowance(
        &self,
        owner: Address,
        token: Address,
        router: Address,
    ) -> ChainResult<RouterAllowance> {
        let allowance = self
            .reader
            .router_allowance(self.transfer_proxy, owner, token, router)
            .await?;
        logger::debug(
            LogTag::Allowance,
            &format!(
                "Router allowance: amount={} expiration={}",
                allowance.amount, allowance.expiration
            ),
        );
        Ok(allowance)
    }

    /// Read both allowance layers and decide which approvals are needed
    pub async fn plan(
        &self,
        owner: Address,
        token: Address,
        amount_in: U256,
        now: u64,
    ) -> ChainResult<ApprovalPlan> {
        let token_allowance = self.check_transfer_proxy_allowance(owner, token).await?;
        let router_allowance = self.check_router_allowance(owner, token, self.router).await?;

        Ok(ApprovalPlan {
            token_allowance,
            router_allowance,
            transfer_proxy_required: transfer_proxy_approval_required(token_allowance, amount_in),
            router_required: router_approval_required(&router_allowance, amount_in, now),
        })
    }

    /// ERC-20 approve of the transfer proxy for the maximum amount
    pub fn transfer_proxy_approval_call(&self, token: Address) -> TxCall {
        let call = abi::IERC20::approveCall {
            spender: self.transfer_proxy,
            amount: U256::MAX,
        };
        TxCall::new(token, call.abi_encode())
    }

    /// Permit2 approve of the router for max uint160, valid for one year
    pub fn router_approval_call(&self, token: Address, now: u64) -> TxCall {
        let expiration = now.saturating_add(ROUTER_ALLOWANCE_LIFETIME_SECS);
        let call = abi::IAllowanceTransfer::approveCall {
            token,
            spender: self.router,
            amount: U160::MAX,
            expiration: U48::saturating_from(expiration),
        };
        TxCall::new(self.transfer_proxy, call.abi_encode())
    }

    /// Submit the transfer proxy approval and wait for its receipt
    pub async fn approve_transfer_proxy(&self, token: Address) -> ChainResult<TxReceipt> {
        logger::info(LogTag::Allowance, "Approving Permit2 to spend the input token");
        let receipt = send_and_confirm(
            self.signer.as_ref(),
            self.transfer_proxy_approval_call(token),
            self.poll_interval,
        )
        .await?;
        logger::info(
            LogTag::Allowance,
            &format!("Permit2 approval confirmed in {}", short_hash(&receipt.hash)),
        );
        Ok(receipt)
    }

    /// Submit the router allowance approval and wait for its receipt
    pub async fn approve_router(&self, token: Address, now: u64) -> ChainResult<TxReceipt> {
        logger::info(LogTag::Allowance, "Approving the router through Permit2");
        let receipt = send_and_confirm(
            self.signer.as_ref(),
            self.router_approval_call(token, now),
            self.poll_interval,
        )
        .await?;
        logger::info(
            LogTag::Allowance,
            &format!("Router approval confirmed in {}", short_hash(&receipt.hash)),
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChain;
    use crate::config::PERMIT2_ADDRESS;
    use alloy::primitives::address;

    const OWNER: Address = address!("0x00000000000000000000000000000000000000aa");
    const TOKEN: Address = address!("0x471EcE3750Da237f93B8E339c536989b8978a438");
    const ROUTER: Address = address!("0x2222222222222222222222222222222222222222");
    const NOW: u64 = 1_700_000_000;

    fn manager(chain: Arc<MockChain>) -> AllowanceManager {
        let contracts = ContractsConfig {
            transfer_proxy: PERMIT2_ADDRESS,
            router: ROUTER,
            quoter: address!("0x3333333333333333333333333333333333333333"),
        };
        AllowanceManager::new(chain.clone(), chain, &contracts, Duration::from_millis(1))
    }

    #[test]
    fn router_allowance_renewal_rules() {
        let amount = U256::from(100u64);
        let healthy = RouterAllowance {
            amount: U256::from(100u64),
            expiration: NOW + ROUTER_ALLOWANCE_EXPIRY_BUFFER_SECS,
        };
        assert!(!router_approval_required(&healthy, amount, NOW));

        let expiring = RouterAllowance {
            expiration: NOW + ROUTER_ALLOWANCE_EXPIRY_BUFFER_SECS - 1,
            ..healthy
        };
        assert!(router_approval_required(&expiring, amount, NOW));

        let short = RouterAllowance {
            amount: U256::from(99u64),
            ..healthy
        };
        assert!(router_approval_required(&short, amount, NOW));
    }

    #[tokio::test]
    async fn fresh_wallet_needs_both_approvals_in_order() {
        let chain = Arc::new(MockChain::new(OWNER));
        let plan = manager(chain)
            .plan(OWNER, TOKEN, U256::from(100u64), NOW)
            .await
            .unwrap();

        assert_eq!(
            plan.required(),
            vec![ApprovalStep::TransferProxy, ApprovalStep::RouterAllowance]
        );
    }

    #[tokio::test]
    async fn sufficient_allowances_need_nothing() {
        let chain = Arc::new(MockChain::new(OWNER));
        chain.set_token_allowance(TOKEN, OWNER, PERMIT2_ADDRESS, U256::MAX);
        chain.set_router_allowance(
            OWNER,
            TOKEN,
            ROUTER,
            RouterAllowance {
                amount: U256::from(1_000u64),
                expiration: NOW + 86_400,
            },
        );

        let plan = manager(chain)
            .plan(OWNER, TOKEN, U256::from(100u64), NOW)
            .await
            .unwrap();
        assert!(plan.is_ready());
        assert!(plan.required().is_empty());
    }

    #[tokio::test]
    async fn approvals_take_effect_once_confirmed() {
        let chain = Arc::new(MockChain::new(OWNER));
        let manager = manager(chain.clone());

        manager.approve_transfer_proxy(TOKEN).await.unwrap();
        manager.approve_router(TOKEN, NOW).await.unwrap();

        let sent = chain.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, TOKEN);
        assert_eq!(sent[1].to, PERMIT2_ADDRESS);

        let plan = manager.plan(OWNER, TOKEN, U256::from(100u64), NOW).await.unwrap();
        assert_eq!(plan.token_allowance, U256::MAX);
        assert_eq!(plan.router_allowance.amount, U256::from(U160::MAX));
        assert_eq!(
            plan.router_allowance.expiration,
            NOW + ROUTER_ALLOWANCE_LIFETIME_SECS
        );
        assert!(plan.is_ready());
    }

    #[tokio::test]
    async fn reverted_approval_is_an_error() {
        let chain = Arc::new(MockChain::new(OWNER));
        chain.revert_calls_to(TOKEN);

        let err = manager(chain).approve_transfer_proxy(TOKEN).await.unwrap_err();
        assert!(matches!(err, crate::errors::ChainError::Reverted(_)));
    }
}
