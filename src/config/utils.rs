/// Configuration utilities - loading and validation
///
/// The loaded record is returned to the caller, which hands it to each
/// component at construction.
use super::schemas::Config;
use crate::errors::ConfigError;
use crate::logger::{self, LogTag};
use crate::pool::PoolKey;
use alloy::primitives::Address;
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Environment variable holding the hex private key of the signing account
pub const PRIVATE_KEY_ENV: &str = "V4SWAP_PRIVATE_KEY";

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. The result is validated before it is returned.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: display.clone(),
            error: e.to_string(),
        })?;
        parse_config(&contents).map_err(|e| ConfigError::Parse {
            path: display.clone(),
            error: e.to_string(),
        })?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", display),
        );
        Config::default()
    };

    validate_config(&config)?;
    logger::debug(LogTag::Config, &format!("Loaded configuration from {}", display));
    Ok(config)
}

/// Parse a TOML document into a config record (no validation)
pub fn parse_config(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(contents)
}

/// Check the invariants the swap flow relies on
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let required = [
        ("tokens.input.address", config.tokens.input.address),
        ("tokens.output.address", config.tokens.output.address),
        ("contracts.transfer_proxy", config.contracts.transfer_proxy),
        ("contracts.router", config.contracts.router),
        ("contracts.quoter", config.contracts.quoter),
    ];
    for (field, address) in required {
        if address == Address::ZERO {
            return Err(ConfigError::Missing(format!("{} must be set", field)));
        }
    }

    for (field, decimals) in [
        ("tokens.input.decimals", config.tokens.input.decimals),
        ("tokens.output.decimals", config.tokens.output.decimals),
    ] {
        if decimals > 77 {
            return Err(ConfigError::invalid(field, "at most 77 decimals fit a uint256"));
        }
    }

    // Distinct tokens and the fee/tick spacing ranges are the pool key's rules
    PoolKey::from_config(config)?;

    if config.rpc.url.trim().is_empty() {
        return Err(ConfigError::Missing("rpc.url must be set".to_string()));
    }

    if config.explorer.host.trim().is_empty() {
        return Err(ConfigError::Missing("explorer.host must be set".to_string()));
    }

    Ok(())
}
