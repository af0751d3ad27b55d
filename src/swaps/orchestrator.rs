/// Swap orchestrator - sequences one swap attempt end to end
///
/// Balance check, allowance checks, conditional approvals, plan building,
/// submission and confirmation run strictly in order. Every transaction is
/// confirmed before the next step starts. Progress is published through a
/// watch channel and kept as a transition trail for the current attempt.
use super::allowance::{AllowanceManager, ApprovalPlan};
use super::guard::SignerSlotGuard;
use super::plan::SwapPlanBuilder;
use super::quote::{describe_quote, QuoteService};
use super::state::{transition, InvalidTransition, SwapEvent, SwapExecutionState};
use super::types::{Quote, SwapIntent, SwapOutcome};
use crate::amounts::TokenAmount;
use crate::balances::{read_balances, BalanceSnapshot};
use crate::chain::{wait_for_receipt, ChainReader, ChainSigner};
use crate::config::Config;
use crate::errors::{FailureKind, FailureStage, SwapError, SwapFailure};
use crate::logger::{self, LogTag};
use crate::pool::PoolKey;
use crate::utils::{explorer_tx_url, short_address, short_hash, Clock};
use alloy::primitives::{Address, U256};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Mutable record of the current attempt
///
/// `state` is authoritative; the watch channel only mirrors it and is written
/// while this record is locked.
#[derive(Default)]
struct Attempt {
    state: SwapExecutionState,
    intent: Option<SwapIntent>,
    quote: Option<Quote>,
    failure: Option<SwapFailure>,
    outcome: Option<SwapOutcome>,
    balances: Option<BalanceSnapshot>,
    history: Vec<SwapExecutionState>,
}

pub struct SwapOrchestrator {
    config: Config,
    pool_key: PoolKey,
    reader: Arc<dyn ChainReader>,
    signer: Arc<dyn ChainSigner>,
    clock: Arc<dyn Clock>,
    allowances: AllowanceManager,
    quotes: QuoteService,
    planner: SwapPlanBuilder,
    state_tx: watch::Sender<SwapExecutionState>,
    attempt: Mutex<Attempt>,
}

impl SwapOrchestrator {
    pub fn new(
        config: Config,
        reader: Arc<dyn ChainReader>,
        signer: Arc<dyn ChainSigner>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SwapError> {
        let pool_key = PoolKey::from_config(&config)?;
        let poll_interval = Duration::from_millis(config.rpc.receipt_poll_interval_ms);

        let allowances = AllowanceManager::new(
            reader.clone(),
            signer.clone(),
            &config.contracts,
            poll_interval,
        );
        let quotes = QuoteService::new(reader.clone(), config.contracts.quoter);
        let planner = SwapPlanBuilder::new(config.contracts.router);
        let (state_tx, _) = watch::channel(SwapExecutionState::Idle);

        Ok(Self {
            config,
            pool_key,
            reader,
            signer,
            clock,
            allowances,
            quotes,
            planner,
            state_tx,
            attempt: Mutex::new(Attempt {
                history: vec![SwapExecutionState::Idle],
                ..Attempt::default()
            }),
        })
    }

    // =========================================================================
    // OBSERVERS
    // =========================================================================

    pub fn state(&self) -> SwapExecutionState {
        self.attempt.lock().state.clone()
    }

    /// Receiver that sees every state change
    pub fn subscribe(&self) -> watch::Receiver<SwapExecutionState> {
        self.state_tx.subscribe()
    }

    /// States visited since the last reset, oldest first
    pub fn history(&self) -> Vec<SwapExecutionState> {
        self.attempt.lock().history.clone()
    }

    pub fn intent(&self) -> Option<SwapIntent> {
        self.attempt.lock().intent.clone()
    }

    pub fn last_quote(&self) -> Option<Quote> {
        self.attempt.lock().quote.clone()
    }

    pub fn last_failure(&self) -> Option<SwapFailure> {
        self.attempt.lock().failure.clone()
    }

    pub fn last_outcome(&self) -> Option<SwapOutcome> {
        self.attempt.lock().outcome.clone()
    }

    pub fn last_balances(&self) -> Option<BalanceSnapshot> {
        self.attempt.lock().balances.clone()
    }

    pub fn pool_key(&self) -> &PoolKey {
        &self.pool_key
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    // =========================================================================
    // STATE CHANGES
    // =========================================================================

    /// Validate `event` against the current state and publish the result.
    /// Check, history and publish happen under one lock of `attempt`.
    fn apply_locked(
        &self,
        attempt: &mut Attempt,
        event: SwapEvent,
    ) -> Result<SwapExecutionState, InvalidTransition> {
        let next = transition(&attempt.state, event)?;

        logger::debug(
            LogTag::Swap,
            &format!("State {} -> {}", attempt.state.name(), next.name()),
        );
        if !next.is_terminal() {
            logger::info(LogTag::Swap, &next.label());
        }

        if next == SwapExecutionState::Idle {
            attempt.history.clear();
        }
        attempt.history.push(next.clone());
        attempt.state = next.clone();
        self.state_tx.send_replace(next.clone());
        Ok(next)
    }

    fn apply(&self, event: SwapEvent) -> Result<SwapExecutionState, InvalidTransition> {
        let mut attempt = self.attempt.lock();
        self.apply_locked(&mut attempt, event)
    }

    fn reset_locked(&self, attempt: &mut Attempt) -> Result<(), InvalidTransition> {
        self.apply_locked(attempt, SwapEvent::Reset)?;
        attempt.intent = None;
        attempt.quote = None;
        Ok(())
    }

    /// Record `failure`, move to `Failed` and hand back the error to return
    fn fail(&self, failure: SwapFailure) -> SwapError {
        logger::error(LogTag::Swap, &failure.user_message());
        let mut attempt = self.attempt.lock();
        match self.apply_locked(&mut attempt, SwapEvent::Failed(failure.clone())) {
            Ok(_) => {
                attempt.failure = Some(failure.clone());
                SwapError::Failed(failure)
            }
            Err(e) => SwapError::InvalidTransition(e),
        }
    }

    /// Abandon the current attempt; refused once a transaction may be pending
    pub fn reset(&self) -> Result<(), SwapError> {
        let mut attempt = self.attempt.lock();
        self.reset_locked(&mut attempt)?;
        Ok(())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Quote selling `amount_in` base units of the configured input token.
    ///
    /// A ready or finished attempt is reset first, so a new amount always
    /// starts a new attempt.
    pub async fn request_quote(&self, amount_in: U256) -> Result<Quote, SwapError> {
        let intent = SwapIntent::new(
            self.config.tokens.input.address,
            self.config.tokens.output.address,
            amount_in,
            Some(self.signer.address()),
        )?;

        {
            let mut attempt = self.attempt.lock();
            if matches!(
                attempt.state,
                SwapExecutionState::QuoteReady
                    | SwapExecutionState::Succeeded
                    | SwapExecutionState::Failed(_)
            ) {
                self.reset_locked(&mut attempt)?;
            }
            self.apply_locked(&mut attempt, SwapEvent::QuoteRequested)?;
            attempt.intent = Some(intent.clone());
        }

        let quote = match self.quotes.quote_intent(&self.pool_key, &intent).await {
            Ok(quote) => quote,
            Err(failure) => return Err(self.fail(failure)),
        };

        logger::info(
            LogTag::Quote,
            &format!(
                "Quote: {}",
                describe_quote(
                    &quote,
                    self.config.tokens.input.decimals,
                    self.config.tokens.output.decimals
                )
            ),
        );

        {
            let mut attempt = self.attempt.lock();
            self.apply_locked(&mut attempt, SwapEvent::QuoteReceived)?;
            attempt.quote = Some(quote.clone());
        }
        Ok(quote)
    }

    /// Run the swap for the ready quote.
    ///
    /// Fails immediately with [`SwapError::AttemptInFlight`] when another
    /// attempt holds the signer's slot.
    pub async fn execute_swap(&self) -> Result<SwapOutcome, SwapError> {
        let owner = self.signer.address();
        let _slot = SignerSlotGuard::acquire(owner)?;

        // The quote taken here is the one the transition validated
        let (intent, quote) = {
            let mut attempt = self.attempt.lock();
            let (intent, quote) = match (&attempt.intent, &attempt.quote) {
                (Some(intent), Some(quote)) => (intent.clone(), quote.clone()),
                _ => return Err(SwapError::NoQuote),
            };
            self.apply_locked(&mut attempt, SwapEvent::ExecuteRequested)?;
            (intent, quote)
        };
        logger::info(
            LogTag::Swap,
            &format!(
                "Swapping {} {} for {} from {}",
                TokenAmount::new(intent.amount_in, self.config.tokens.input.decimals),
                self.config.tokens.input.symbol,
                self.config.tokens.output.symbol,
                short_address(&owner)
            ),
        );

        // Balance
        let balance = self
            .reader
            .balance_of(intent.input_token, owner)
            .await
            .map_err(|e| self.fail(SwapFailure::classify(FailureStage::BalanceCheck, &e)))?;
        if balance < intent.amount_in {
            return Err(self.fail(SwapFailure::new(
                FailureKind::InsufficientFunds,
                format!(
                    "balance {} {} is below {}",
                    TokenAmount::new(balance, self.config.tokens.input.decimals),
                    self.config.tokens.input.symbol,
                    TokenAmount::new(intent.amount_in, self.config.tokens.input.decimals)
                ),
            )));
        }

        let mut approvals = Vec::new();

        // Transfer proxy allowance
        let token_allowance = self
            .allowances
            .check_transfer_proxy_allowance(owner, intent.input_token)
            .await
            .map_err(|e| self.fail(SwapFailure::classify(FailureStage::AllowanceRead, &e)))?;
        if super::allowance::transfer_proxy_approval_required(token_allowance, intent.amount_in) {
            self.apply(SwapEvent::TransferProxyApprovalRequired)?;
            let receipt = self
                .allowances
                .approve_transfer_proxy(intent.input_token)
                .await
                .map_err(|e| self.fail(SwapFailure::classify(FailureStage::Approval, &e)))?;
            approvals.push(receipt.hash);
        }

        // Router allowance, read after any transfer proxy approval confirmed
        let router_allowance = self
            .allowances
            .check_router_allowance(owner, intent.input_token, self.allowances.router())
            .await
            .map_err(|e| self.fail(SwapFailure::classify(FailureStage::AllowanceRead, &e)))?;
        let now = self.clock.now_unix();
        if super::allowance::router_approval_required(&router_allowance, intent.amount_in, now) {
            self.apply(SwapEvent::RouterApprovalRequired)?;
            let receipt = self
                .allowances
                .approve_router(intent.input_token, now)
                .await
                .map_err(|e| self.fail(SwapFailure::classify(FailureStage::Approval, &e)))?;
            approvals.push(receipt.hash);
        }

        self.apply(SwapEvent::AllowancesReady)?;

        // Plan
        let plan = self
            .planner
            .build(&quote, intent.slippage_bps, self.clock.now_unix())
            .map_err(|e| {
                self.fail(SwapFailure::new(FailureKind::EnvironmentMismatch, e.to_string()))
            })?;
        self.apply(SwapEvent::PlanBuilt)?;

        // Submit
        let hash = self
            .signer
            .send(plan.call.clone())
            .await
            .map_err(|e| self.fail(SwapFailure::classify(FailureStage::Submission, &e)))?;
        logger::info(LogTag::Swap, &format!("Swap submitted: {}", short_hash(&hash)));
        self.apply(SwapEvent::Submitted)?;

        // Confirm
        let poll_interval = Duration::from_millis(self.config.rpc.receipt_poll_interval_ms);
        let receipt = wait_for_receipt(self.signer.as_ref(), hash, poll_interval)
            .await
            .map_err(|e| self.fail(SwapFailure::classify(FailureStage::Confirmation, &e)))?;
        if !receipt.success {
            return Err(self.fail(SwapFailure::new(
                FailureKind::SubmissionFailure,
                format!("transaction {} reverted", hash),
            )));
        }

        let outcome = SwapOutcome {
            tx_hash: hash,
            block_number: receipt.block_number,
            amount_in: intent.amount_in,
            quoted_amount_out: quote.amount_out,
            amount_out_minimum: plan.amount_out_minimum,
            explorer_url: explorer_tx_url(&self.config.explorer.host, &hash),
            approvals,
        };
        {
            let mut attempt = self.attempt.lock();
            self.apply_locked(&mut attempt, SwapEvent::Confirmed)?;
            attempt.outcome = Some(outcome.clone());
        }

        logger::info(
            LogTag::Swap,
            &format!(
                "Swap successful in block {:?}: {}",
                receipt.block_number, outcome.explorer_url
            ),
        );

        self.refresh_balances().await;
        Ok(outcome)
    }

    /// After a success, keep the result visible for the configured delay and
    /// then start over with a cleared intent.
    ///
    /// An attempt started during the delay is left alone.
    pub async fn complete(&self) -> Result<(), SwapError> {
        let current = self.state();
        if current != SwapExecutionState::Succeeded {
            return Err(InvalidTransition::new(&current, "Complete").into());
        }

        tokio::time::sleep(Duration::from_millis(self.config.swaps.reset_delay_ms)).await;

        let mut attempt = self.attempt.lock();
        if attempt.state != SwapExecutionState::Succeeded {
            logger::debug(
                LogTag::Swap,
                &format!("Skipping reset, a new attempt is at {}", attempt.state.name()),
            );
            return Ok(());
        }
        self.reset_locked(&mut attempt)?;
        Ok(())
    }

    /// Approvals the current intent would need right now; read-only
    pub async fn pending_approvals(&self) -> Result<ApprovalPlan, SwapError> {
        let intent = self.intent().ok_or(SwapError::NoQuote)?;
        let plan = self
            .allowances
            .plan(
                self.signer.address(),
                intent.input_token,
                intent.amount_in,
                self.clock.now_unix(),
            )
            .await?;
        Ok(plan)
    }

    /// Re-read both pool token balances of the signing account
    pub async fn refresh_balances(&self) -> BalanceSnapshot {
        let snapshot =
            read_balances(self.reader.as_ref(), self.signer.address(), &self.config.tokens).await;
        self.attempt.lock().balances = Some(snapshot.clone());
        snapshot
    }

    /// Swap sizing helper: base units for a human amount of the input token
    pub fn parse_input_amount(&self, text: &str) -> Result<U256, SwapError> {
        let amount = TokenAmount::parse(text, self.config.tokens.input.decimals)?;
        Ok(amount.raw)
    }
}
