use alloy::primitives::{Address, B256};
use chrono::Utc;

/// Source of the current unix time.
///
/// Allowance expirations and router deadlines are computed from it, so tests
/// pin it with [`FixedClock`].
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        Utc::now().timestamp().max(0) as u64
    }
}

/// Clock frozen at a given unix timestamp
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_unix(&self) -> u64 {
        self.0
    }
}

/// `0x1234…abcd` form for log lines
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

/// `0x12345678…abcdef12` form for hashes and pool ids
pub fn short_hash(hash: &B256) -> String {
    let full = hash.to_string();
    format!("{}…{}", &full[..10], &full[full.len() - 8..])
}

/// Block explorer link for a transaction: `https://<host>/tx/<hash>`
pub fn explorer_tx_url(host: &str, hash: &B256) -> String {
    let host = host
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{}/tx/{}", host, hash)
}
