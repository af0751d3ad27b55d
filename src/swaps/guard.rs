/// One in-flight swap attempt per signing account
///
/// A process-wide slot set keyed by signer address. A slot is taken before
/// the first chain interaction of an attempt and released by
/// [`SignerSlotGuard`] on every exit path.
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::utils::short_address;
use alloy::primitives::Address;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;

static IN_FLIGHT_SIGNERS: Lazy<Mutex<HashSet<Address>>> = Lazy::new(|| Mutex::new(HashSet::new()));

pub fn is_signer_busy(signer: Address) -> bool {
    IN_FLIGHT_SIGNERS.lock().contains(&signer)
}

/// RAII guard to ensure signer slots are always released
#[derive(Debug)]
pub struct SignerSlotGuard {
    signer: Address,
}

impl SignerSlotGuard {
    /// Take the slot for `signer`, failing when another attempt holds it
    pub fn acquire(signer: Address) -> Result<Self, SwapError> {
        let mut in_flight = IN_FLIGHT_SIGNERS.lock();
        if !in_flight.insert(signer) {
            logger::warning(
                LogTag::Swap,
                &format!(
                    "Refusing swap: an attempt is already in flight for {}",
                    short_address(&signer)
                ),
            );
            return Err(SwapError::AttemptInFlight(signer));
        }
        Ok(Self { signer })
    }
}

impl Drop for SignerSlotGuard {
    fn drop(&mut self) {
        IN_FLIGHT_SIGNERS.lock().remove(&self.signer);
    }
}
