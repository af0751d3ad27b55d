//! Configuration record for the swap flow
//!
//! Token addresses, pool parameters and contract addresses are supplied
//! externally (TOML file) and never re-derived at runtime.

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::*;
pub use utils::{
    load_config_from_path, parse_config, validate_config, CONFIG_FILE_PATH, PRIVATE_KEY_ENV,
};
