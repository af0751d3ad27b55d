/// Token amounts as raw integers with an explicit decimals count
///
/// On-chain values stay `U256`; `f64` appears only in display helpers.
use crate::errors::SwapError;
use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Parse a human decimal string ("1.5") into base units
    pub fn parse(text: &str, decimals: u8) -> Result<Self, SwapError> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('-') {
            return Err(SwapError::InvalidIntent(format!(
                "amount '{}' must be a positive number",
                text
            )));
        }

        let parsed = parse_units(text, decimals).map_err(|e| {
            SwapError::InvalidIntent(format!("invalid amount '{}': {}", text, e))
        })?;

        Ok(Self::new(parsed.get_absolute(), decimals))
    }

    /// Exact decimal rendering without trailing zeros ("1.5", "150")
    pub fn to_decimal_string(&self) -> String {
        let full = format_units(self.raw, self.decimals).unwrap_or_else(|_| self.raw.to_string());
        if full.contains('.') {
            full.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            full
        }
    }

    /// Lossy value for display ratios only
    pub fn to_f64(&self) -> f64 {
        self.to_decimal_string().parse::<f64>().unwrap_or(0.0)
    }

    /// Rounded rendering with a fixed number of fraction digits
    pub fn display(&self, precision: usize) -> String {
        format!("{:.*}", precision, self.to_f64())
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Output units received per input unit, for display
pub fn display_price(amount_out: &TokenAmount, amount_in: &TokenAmount) -> Option<f64> {
    let input = amount_in.to_f64();
    if input == 0.0 {
        return None;
    }
    Some(amount_out.to_f64() / input)
}
