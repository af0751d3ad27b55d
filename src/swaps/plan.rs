/// Universal Router call encoding for a single-pool exact-input swap
///
/// Action blob: `abi.encode(bytes actions, bytes[] params)` with actions
/// SWAP_EXACT_IN_SINGLE, SETTLE_ALL, TAKE_ALL. The blob becomes the sole
/// input of one V4_SWAP router command.
use super::config::{
    ACTION_SETTLE_ALL, ACTION_SWAP_EXACT_IN_SINGLE, ACTION_TAKE_ALL, BPS_DENOMINATOR,
    SWAP_DEADLINE_SECS, SWAP_HOOK_DATA, V4_SWAP_COMMAND,
};
use super::types::{to_u128, Quote};
use crate::chain::{abi, TxCall};
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};

/// `floor(quoted * (10000 - bps) / 10000)` without intermediate overflow
pub fn amount_out_minimum(quoted: U256, slippage_bps: u32) -> U256 {
    let denominator = U256::from(BPS_DENOMINATOR);
    let keep = U256::from(BPS_DENOMINATOR.saturating_sub(slippage_bps));

    let whole = quoted / denominator;
    let rest = quoted % denominator;
    whole * keep + rest * keep / denominator
}

/// Everything needed to submit and later report the swap
#[derive(Debug, Clone)]
pub struct SwapPlan {
    pub call: TxCall,
    pub commands: Bytes,
    pub actions: Bytes,
    pub deadline: u64,
    pub zero_for_one: bool,
    pub input_currency: Address,
    pub output_currency: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

pub struct SwapPlanBuilder {
    router: Address,
}

impl SwapPlanBuilder {
    pub fn new(router: Address) -> Self {
        Self { router }
    }

    /// Encode the three actions and their parameters into the action blob
    pub fn encode_actions(
        &self,
        quote: &Quote,
        amount_in: u128,
        amount_out_minimum: u128,
    ) -> Bytes {
        let swap = abi::ExactInputSingleParams {
            poolKey: quote.pool_key.to_abi(),
            zeroForOne: quote.zero_for_one,
            amountIn: amount_in,
            amountOutMinimum: amount_out_minimum,
            hookData: Bytes::from_static(&SWAP_HOOK_DATA),
        };
        let settle = (quote.input_currency(), U256::from(amount_in));
        let take = (quote.output_currency(), U256::from(amount_out_minimum));

        let actions = Bytes::from(vec![
            ACTION_SWAP_EXACT_IN_SINGLE,
            ACTION_SETTLE_ALL,
            ACTION_TAKE_ALL,
        ]);
        let params: Vec<Bytes> = vec![
            swap.abi_encode().into(),
            settle.abi_encode_params().into(),
            take.abi_encode_params().into(),
        ];

        (actions, params).abi_encode_params().into()
    }

    /// Build the router `execute` call for `quote`, valid until `now` plus
    /// the swap deadline
    pub fn build(&self, quote: &Quote, slippage_bps: u32, now: u64) -> Result<SwapPlan, SwapError> {
        let minimum = amount_out_minimum(quote.amount_out, slippage_bps);
        let amount_in = to_u128(quote.amount_in, "amount")?;
        let minimum_u128 = to_u128(minimum, "minimum output")?;

        let actions = self.encode_actions(quote, amount_in, minimum_u128);
        let commands = Bytes::from(vec![V4_SWAP_COMMAND]);
        let deadline = now.saturating_add(SWAP_DEADLINE_SECS);

        let execute = abi::IUniversalRouter::executeCall {
            commands: commands.clone(),
            inputs: vec![actions.clone()],
            deadline: U256::from(deadline),
        };

        logger::debug(
            LogTag::Swap,
            &format!(
                "Plan: amount_in={} min_out={} zero_for_one={} deadline={}",
                amount_in, minimum, quote.zero_for_one, deadline
            ),
        );

        Ok(SwapPlan {
            call: TxCall::new(self.router, execute.abi_encode()),
            commands,
            actions,
            deadline,
            zero_for_one: quote.zero_for_one,
            input_currency: quote.input_currency(),
            output_currency: quote.output_currency(),
            amount_in: quote.amount_in,
            amount_out_minimum: minimum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolKey;
    use crate::swaps::config::SLIPPAGE_TOLERANCE_BPS;
    use alloy::primitives::address;
    use chrono::Utc;

    const CELO: Address = address!("0x471EcE3750Da237f93B8E339c536989b8978a438");
    const BTK: Address = address!("0x1111111111111111111111111111111111111111");
    const ROUTER: Address = address!("0x2222222222222222222222222222222222222222");

    fn quote(amount_in: u64, amount_out: u64) -> Quote {
        let pool_key = PoolKey::from_unsorted(CELO, BTK, 500, 60, Address::ZERO).unwrap();
        Quote {
            amount_in: U256::from(amount_in),
            amount_out: U256::from(amount_out),
            zero_for_one: pool_key.zero_for_one(CELO).unwrap(),
            pool_key,
            quoted_at: Utc::now(),
        }
    }

    #[test]
    fn minimum_output_rounds_down() {
        assert_eq!(amount_out_minimum(U256::from(1000u64), 50), U256::from(995u64));
        assert_eq!(amount_out_minimum(U256::from(95u64), 50), U256::from(94u64));
        assert_eq!(amount_out_minimum(U256::from(1001u64), 50), U256::from(995u64));
        assert_eq!(amount_out_minimum(U256::ZERO, 50), U256::ZERO);
        assert_eq!(amount_out_minimum(U256::from(1000u64), 20_000), U256::ZERO);
    }

    #[test]
    fn minimum_output_survives_huge_quotes() {
        let min = amount_out_minimum(U256::MAX, 50);
        assert!(min < U256::MAX);
        assert!(min > U256::MAX / U256::from(200u64) * U256::from(198u64));
    }

    #[test]
    fn execute_call_wraps_one_v4_swap_command() {
        let plan = SwapPlanBuilder::new(ROUTER)
            .build(&quote(1_000, 1_000), SLIPPAGE_TOLERANCE_BPS, 1_700_000_000)
            .unwrap();

        assert_eq!(plan.call.to, ROUTER);
        assert_eq!(plan.deadline, 1_700_000_000 + 3600);
        assert_eq!(plan.amount_out_minimum, U256::from(995u64));

        let execute = abi::IUniversalRouter::executeCall::abi_decode(&plan.call.input).unwrap();
        assert_eq!(execute.commands.as_ref(), &[0x10]);
        assert_eq!(execute.inputs, vec![plan.actions.clone()]);
        assert_eq!(execute.deadline, U256::from(plan.deadline));
    }

    #[test]
    fn action_blob_settles_input_and_takes_output() {
        let q = quote(1_000, 1_000);
        let plan = SwapPlanBuilder::new(ROUTER)
            .build(&q, SLIPPAGE_TOLERANCE_BPS, 0)
            .unwrap();

        let (actions, params) = <(Bytes, Vec<Bytes>)>::abi_decode_params(&plan.actions).unwrap();
        assert_eq!(actions.as_ref(), &[0x06, 0x0c, 0x0f]);
        assert_eq!(params.len(), 3);

        let swap = abi::ExactInputSingleParams::abi_decode(&params[0]).unwrap();
        let expected_key = q.pool_key.to_abi();
        assert_eq!(swap.poolKey.currency0, expected_key.currency0);
        assert_eq!(swap.poolKey.currency1, expected_key.currency1);
        assert_eq!(swap.poolKey.fee, expected_key.fee);
        assert_eq!(swap.poolKey.tickSpacing, expected_key.tickSpacing);
        assert_eq!(swap.poolKey.hooks, expected_key.hooks);
        assert!(!swap.zeroForOne);
        assert_eq!(swap.amountIn, 1_000u128);
        assert_eq!(swap.amountOutMinimum, 995u128);
        assert_eq!(swap.hookData.as_ref(), &[0x00]);

        let (settle_currency, settle_amount) =
            <(Address, U256)>::abi_decode_params(&params[1]).unwrap();
        assert_eq!(settle_currency, CELO);
        assert_eq!(settle_amount, U256::from(1_000u64));

        let (take_currency, take_amount) = <(Address, U256)>::abi_decode_params(&params[2]).unwrap();
        assert_eq!(take_currency, BTK);
        assert_eq!(take_amount, U256::from(995u64));
    }

    #[test]
    fn oversized_quote_cannot_be_encoded() {
        let mut q = quote(1_000, 0);
        q.amount_out = U256::MAX;
        assert!(matches!(
            SwapPlanBuilder::new(ROUTER).build(&q, SLIPPAGE_TOLERANCE_BPS, 0),
            Err(SwapError::InvalidIntent(_))
        ));
    }
}
