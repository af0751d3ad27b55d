//! v4swap - client-side swap orchestration for Uniswap v4 pools
//!
//! Quotes through the v4 quoter, manages Permit2 and router allowances, and
//! executes exact-input swaps through the Universal Router.

pub mod amounts;
pub mod balances;
pub mod chain;
pub mod config;
pub mod errors;
pub mod logger;
pub mod pool;
pub mod swaps;
pub mod utils;
