/// Chain boundary errors
///
/// Every failure coming back from the RPC boundary is reduced to one of a few
/// shapes. Wallets and nodes only hand back free-form messages, so the shape
/// is recovered from the message text.
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ChainError {
    #[error("Request rejected by signer: {0}")]
    UserRejected(String),

    #[error("Insufficient funds for transaction: {0}")]
    InsufficientFunds(String),

    #[error("Execution reverted: {0}")]
    Reverted(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

pub type ChainResult<T> = Result<T, ChainError>;

/// Substrings wallets use when the user declines a request (EIP-1193 code 4001)
const USER_REJECTION_MARKERS: [&str; 5] = [
    "user rejected",
    "user denied",
    "rejected the request",
    "code 4001",
    "\"code\":4001",
];

/// Revert reasons that mean the router could not pull the input tokens
const ALLOWANCE_MARKERS: [&str; 3] = [
    "allowanceexpired",
    "insufficientallowance",
    "transfer_from_failed",
];

impl ChainError {
    /// Classify a raw error message from a provider, wallet or node
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if USER_REJECTION_MARKERS.iter().any(|m| lower.contains(m)) {
            ChainError::UserRejected(message)
        } else if lower.contains("insufficient funds") {
            ChainError::InsufficientFunds(message)
        } else if lower.contains("revert") {
            ChainError::Reverted(message)
        } else {
            ChainError::Rpc(message)
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ChainError::UserRejected(m)
            | ChainError::InsufficientFunds(m)
            | ChainError::Reverted(m)
            | ChainError::Rpc(m) => m,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ChainError::UserRejected(_))
    }

    /// A revert caused by a missing or expired allowance
    pub fn is_allowance_failure(&self) -> bool {
        match self {
            ChainError::Reverted(m) => {
                let lower = m.to_lowercase();
                ALLOWANCE_MARKERS.iter().any(|marker| lower.contains(marker))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_rejections_are_recognised() {
        assert!(ChainError::from_message("User rejected the request.").is_user_rejection());
        assert!(ChainError::from_message("MetaMask Tx Signature: User denied transaction signature.")
            .is_user_rejection());
        assert!(ChainError::from_message("code 4001: request declined").is_user_rejection());
    }

    #[test]
    fn node_messages_are_classified() {
        assert_eq!(
            ChainError::from_message("insufficient funds for gas * price + value"),
            ChainError::InsufficientFunds("insufficient funds for gas * price + value".into())
        );
        assert!(matches!(
            ChainError::from_message("execution reverted: V4TooLittleReceived"),
            ChainError::Reverted(_)
        ));
        assert!(matches!(
            ChainError::from_message("connection refused"),
            ChainError::Rpc(_)
        ));
    }

    #[test]
    fn allowance_reverts_are_detected() {
        assert!(ChainError::from_message("execution reverted: AllowanceExpired(1700000000)")
            .is_allowance_failure());
        assert!(ChainError::from_message("execution reverted: TRANSFER_FROM_FAILED")
            .is_allowance_failure());
        assert!(!ChainError::from_message("execution reverted: V4TooLittleReceived")
            .is_allowance_failure());
        assert!(ChainError::from_message("execution reverted: InsufficientAllowance(5, 10)")
            .is_allowance_failure());
        assert!(!ChainError::from_message("execution reverted: allowance check skipped")
            .is_allowance_failure());
        assert!(!ChainError::Rpc("AllowanceExpired".into()).is_allowance_failure());
    }
}
