/// Pool key canonicalization and pool id hashing
///
/// A v4 pool is identified by keccak256 over the packed key
/// `currency0 ‖ currency1 ‖ uint24 fee ‖ int24 tickSpacing ‖ hooks`
/// (66 bytes, big-endian, no padding).
use crate::chain::abi;
use crate::config::Config;
use crate::errors::ConfigError;
use crate::logger::{self, LogTag};
use alloy::primitives::aliases::{I24, U24};
use alloy::primitives::{keccak256, Address, B256};
use serde::Serialize;

/// Length of the packed key encoding
pub const PACKED_KEY_LEN: usize = 66;

/// Largest value representable as uint24
pub const MAX_UINT24: u32 = 0x00FF_FFFF;

/// Bounds of int24
pub const MIN_INT24: i32 = -(1 << 23);
pub const MAX_INT24: i32 = (1 << 23) - 1;

/// Order two token addresses so the smaller comes first
pub fn sort_pair(a: Address, b: Address) -> (Address, Address) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Packed encoding of raw key parameters; `fee` and `tick_spacing` keep their
/// low 24 bits
fn pack(
    currency0: Address,
    currency1: Address,
    fee: u32,
    tick_spacing: i32,
    hooks: Address,
) -> [u8; PACKED_KEY_LEN] {
    let mut out = [0u8; PACKED_KEY_LEN];
    out[0..20].copy_from_slice(currency0.as_slice());
    out[20..40].copy_from_slice(currency1.as_slice());
    out[40..43].copy_from_slice(&fee.to_be_bytes()[1..]);
    out[43..46].copy_from_slice(&(tick_spacing as u32).to_be_bytes()[1..]);
    out[46..66].copy_from_slice(hooks.as_slice());
    out
}

/// Pool id for already sorted key parameters
pub fn compute_pool_id(
    currency0: Address,
    currency1: Address,
    fee: u32,
    tick_spacing: i32,
    hooks: Address,
) -> B256 {
    keccak256(pack(currency0, currency1, fee, tick_spacing, hooks))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PoolKey {
    currency0: Address,
    currency1: Address,
    fee: u32,
    tick_spacing: i32,
    hooks: Address,
}

impl PoolKey {
    /// Build a key from a pair in any order; rejects identical tokens, a zero
    /// tick spacing and parameters that do not fit their on-chain widths
    pub fn from_unsorted(
        token_a: Address,
        token_b: Address,
        fee: u32,
        tick_spacing: i32,
        hooks: Address,
    ) -> Result<Self, ConfigError> {
        if token_a == token_b {
            return Err(ConfigError::invalid("tokens", "pool tokens must differ"));
        }
        if fee > MAX_UINT24 {
            return Err(ConfigError::invalid(
                "pool.fee_tier",
                format!("{} does not fit uint24", fee),
            ));
        }
        if tick_spacing == 0 || !(MIN_INT24..=MAX_INT24).contains(&tick_spacing) {
            return Err(ConfigError::invalid(
                "pool.tick_spacing",
                format!("{} must be a non-zero int24", tick_spacing),
            ));
        }

        let (currency0, currency1) = sort_pair(token_a, token_b);
        Ok(Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        })
    }

    /// Key of the pool trading the configured input/output pair
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let key = Self::from_unsorted(
            config.tokens.input.address,
            config.tokens.output.address,
            config.pool.fee_tier,
            config.pool.tick_spacing,
            config.pool.hooks,
        )?;
        logger::debug(
            LogTag::Pool,
            &format!(
                "Pool {} / {} fee={} tick_spacing={} id={}",
                key.currency0,
                key.currency1,
                key.fee,
                key.tick_spacing,
                key.pool_id()
            ),
        );
        Ok(key)
    }

    pub fn currency0(&self) -> Address {
        self.currency0
    }

    pub fn currency1(&self) -> Address {
        self.currency1
    }

    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    pub fn hooks(&self) -> Address {
        self.hooks
    }

    /// Swap direction for `input`: true when it is currency0, `None` when the
    /// token is not part of the pool
    pub fn zero_for_one(&self, input: Address) -> Option<bool> {
        if input == self.currency0 {
            Some(true)
        } else if input == self.currency1 {
            Some(false)
        } else {
            None
        }
    }

    /// The token received when `input` is sold into the pool
    pub fn other(&self, input: Address) -> Option<Address> {
        self.zero_for_one(input)
            .map(|zero_for_one| if zero_for_one { self.currency1 } else { self.currency0 })
    }

    pub fn pool_id(&self) -> B256 {
        compute_pool_id(
            self.currency0,
            self.currency1,
            self.fee,
            self.tick_spacing,
            self.hooks,
        )
    }

    /// ABI form used in quoter and router calls
    pub fn to_abi(&self) -> abi::PoolKey {
        abi::PoolKey {
            currency0: self.currency0,
            currency1: self.currency1,
            fee: U24::from(self.fee & MAX_UINT24),
            tickSpacing: I24::from_raw(U24::from((self.tick_spacing as u32) & MAX_UINT24)),
            hooks: self.hooks,
        }
    }
}

pub fn encode_packed(key: &PoolKey) -> [u8; PACKED_KEY_LEN] {
    pack(key.currency0, key.currency1, key.fee, key.tick_spacing, key.hooks)
}
