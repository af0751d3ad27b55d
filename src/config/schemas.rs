/// Configuration schemas - every structure defined once with its defaults
///
/// The record is immutable once loaded; components receive it (or the part
/// they need) at construction.
use crate::config_struct;
use alloy::primitives::{address, Address};

/// Canonical Permit2 deployment, identical on every chain
pub const PERMIT2_ADDRESS: Address = address!("0x000000000022D473030F116dDEE9F6B43aC78BA3");

/// Native CELO token (ERC-20 interface) on Celo mainnet
pub const CELO_TOKEN_ADDRESS: Address = address!("0x471EcE3750Da237f93B8E339c536989b8978a438");

// ============================================================================
// RPC CONFIGURATION
// ============================================================================

config_struct! {
    /// JSON-RPC endpoint configuration
    pub struct RpcConfig {
        /// HTTP endpoint used for reads and transaction submission
        url: String = "https://forno.celo.org".to_string(),
        /// Delay between receipt lookups while a transaction is pending
        receipt_poll_interval_ms: u64 = 2000,
    }
}

// ============================================================================
// TOKENS
// ============================================================================

config_struct! {
    /// A token taking part in the swap
    pub struct TokenConfig {
        address: Address = Address::ZERO,
        symbol: String = String::new(),
        decimals: u8 = 18,
    }
}

config_struct! {
    /// Swap direction is always input -> output
    pub struct TokensConfig {
        input: TokenConfig = TokenConfig {
            address: CELO_TOKEN_ADDRESS,
            symbol: "CELO".to_string(),
            decimals: 18,
        },
        output: TokenConfig = TokenConfig {
            address: Address::ZERO,
            symbol: "BTK".to_string(),
            decimals: 2,
        },
    }
}

// ============================================================================
// POOL
// ============================================================================

config_struct! {
    /// Pool parameters; the pair itself comes from [`TokensConfig`]
    pub struct PoolConfig {
        /// Fee tier in hundredths of a basis point (500 = 0.05%)
        fee_tier: u32 = 500,
        tick_spacing: i32 = 60,
        /// Zero address means no hooks
        hooks: Address = Address::ZERO,
    }
}

// ============================================================================
// CONTRACTS
// ============================================================================

config_struct! {
    /// Infrastructure contract addresses
    pub struct ContractsConfig {
        /// Permit2, holds the standard token allowance
        transfer_proxy: Address = PERMIT2_ADDRESS,
        /// Universal Router executing the swap
        router: Address = Address::ZERO,
        /// V4 quoter used for read-only quotes
        quoter: Address = Address::ZERO,
    }
}

// ============================================================================
// SWAPS
// ============================================================================

config_struct! {
    /// Swap flow behaviour
    pub struct SwapsConfig {
        /// How long a successful swap stays visible before the state resets
        reset_delay_ms: u64 = 3000,
    }
}

config_struct! {
    /// Block explorer used for transaction links
    pub struct ExplorerConfig {
        host: String = "celoscan.io".to_string(),
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root configuration record
    pub struct Config {
        rpc: RpcConfig = RpcConfig::default(),
        tokens: TokensConfig = TokensConfig::default(),
        pool: PoolConfig = PoolConfig::default(),
        contracts: ContractsConfig = ContractsConfig::default(),
        swaps: SwapsConfig = SwapsConfig::default(),
        explorer: ExplorerConfig = ExplorerConfig::default(),
    }
}
