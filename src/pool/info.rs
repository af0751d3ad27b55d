/// Human readable description of the configured pool
use super::key::PoolKey;
use crate::config::Config;
use crate::utils::{short_address, short_hash};
use alloy::primitives::{Address, B256};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PoolInfo {
    pub token0: Address,
    pub token0_symbol: String,
    pub token1: Address,
    pub token1_symbol: String,
    /// Fee tier as a percentage (500 -> 0.05)
    pub fee_percent: f64,
    pub tick_spacing: i32,
    pub hooks: Address,
    pub pool_id: B256,
}

impl PoolInfo {
    pub fn new(key: &PoolKey, config: &Config) -> Self {
        let symbol_of = |token: Address| {
            if token == config.tokens.input.address {
                config.tokens.input.symbol.clone()
            } else if token == config.tokens.output.address {
                config.tokens.output.symbol.clone()
            } else {
                short_address(&token)
            }
        };

        Self {
            token0: key.currency0(),
            token0_symbol: symbol_of(key.currency0()),
            token1: key.currency1(),
            token1_symbol: symbol_of(key.currency1()),
            fee_percent: key.fee() as f64 / 10_000.0,
            tick_spacing: key.tick_spacing(),
            hooks: key.hooks(),
            pool_id: key.pool_id(),
        }
    }

    pub fn short_id(&self) -> String {
        short_hash(&self.pool_id)
    }

    pub fn has_hooks(&self) -> bool {
        self.hooks != Address::ZERO
    }
}

impl std::fmt::Display for PoolInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pool {}", self.short_id())?;
        writeln!(f, "  token0:       {} ({})", self.token0_symbol, self.token0)?;
        writeln!(f, "  token1:       {} ({})", self.token1_symbol, self.token1)?;
        writeln!(f, "  fee:          {}%", self.fee_percent)?;
        writeln!(f, "  tick spacing: {}", self.tick_spacing)?;
        if self.has_hooks() {
            writeln!(f, "  hooks:        {}", self.hooks)?;
        } else {
            writeln!(f, "  hooks:        none")?;
        }
        write!(f, "  pool id:      {}", self.pool_id)
    }
}
