/// Data carried through one swap attempt
use crate::errors::SwapError;
use crate::pool::PoolKey;
use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::config::SLIPPAGE_TOLERANCE_BPS;

/// Convert an amount that must fit a uint128 router field
pub fn to_u128(value: U256, what: &str) -> Result<u128, SwapError> {
    u128::try_from(value)
        .map_err(|_| SwapError::InvalidIntent(format!("{} {} does not fit uint128", what, value)))
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapIntent {
    pub input_token: Address,
    pub output_token: Address,
    pub amount_in: U256,
    pub slippage_bps: u32,
    /// Display only; output always goes to the signing account
    pub recipient: Option<Address>,
}

impl SwapIntent {
    pub fn new(
        input_token: Address,
        output_token: Address,
        amount_in: U256,
        recipient: Option<Address>,
    ) -> Result<Self, SwapError> {
        if amount_in.is_zero() {
            return Err(SwapError::InvalidIntent("amount must be greater than zero".to_string()));
        }
        to_u128(amount_in, "amount")?;
        if input_token == output_token {
            return Err(SwapError::InvalidIntent(
                "input and output tokens must differ".to_string(),
            ));
        }

        Ok(Self {
            input_token,
            output_token,
            amount_in,
            slippage_bps: SLIPPAGE_TOLERANCE_BPS,
            recipient,
        })
    }
}

/// Expected output for an intent; never cached or expired
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub amount_in: U256,
    pub amount_out: U256,
    pub zero_for_one: bool,
    pub pool_key: PoolKey,
    pub quoted_at: DateTime<Utc>,
}

impl Quote {
    pub fn input_currency(&self) -> Address {
        if self.zero_for_one {
            self.pool_key.currency0()
        } else {
            self.pool_key.currency1()
        }
    }

    pub fn output_currency(&self) -> Address {
        if self.zero_for_one {
            self.pool_key.currency1()
        } else {
            self.pool_key.currency0()
        }
    }
}

/// Result of a confirmed swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub amount_in: U256,
    pub quoted_amount_out: U256,
    pub amount_out_minimum: U256,
    pub explorer_url: String,
    /// Approval transactions sent during this attempt, in order
    pub approvals: Vec<B256>,
}
