/// Error handling for v4swap
///
/// Three layers:
/// - [`ChainError`]: what the RPC boundary reports
/// - [`SwapFailure`]: the classified, user-facing reason a swap attempt ended
/// - [`SwapError`]: everything a library call can return
use alloy::primitives::Address;
use serde::Serialize;

pub mod chain;
pub use chain::*;

use crate::swaps::state::InvalidTransition;

// =============================================================================
// FAILURE TAXONOMY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// The signer declined a signature request
    UserRejected,
    /// Balance below the requested amount
    InsufficientFunds,
    /// The read-only quote call failed or reverted
    QuoteFailure,
    /// An approval transaction failed or was not confirmed
    ApprovalFailure,
    /// The swap transaction failed or reverted
    SubmissionFailure,
    /// Remote state diverged from what was last observed, or any other
    /// unexpected remote failure
    EnvironmentMismatch,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UserRejected => "USER_REJECTED",
            FailureKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            FailureKind::QuoteFailure => "QUOTE_FAILURE",
            FailureKind::ApprovalFailure => "APPROVAL_FAILURE",
            FailureKind::SubmissionFailure => "SUBMISSION_FAILURE",
            FailureKind::EnvironmentMismatch => "ENVIRONMENT_MISMATCH",
        }
    }

    /// Short human description shown ahead of the underlying message
    pub fn description(&self) -> &'static str {
        match self {
            FailureKind::UserRejected => "Transaction rejected by user",
            FailureKind::InsufficientFunds => "Insufficient funds for transaction",
            FailureKind::QuoteFailure => "Failed to get quote",
            FailureKind::ApprovalFailure => "Approval failed",
            FailureKind::SubmissionFailure => "Swap transaction failed",
            FailureKind::EnvironmentMismatch => "On-chain state changed unexpectedly",
        }
    }

    /// Whether simply trying again, unchanged, can succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            FailureKind::UserRejected => true,
            FailureKind::QuoteFailure => true,
            FailureKind::ApprovalFailure => true,
            FailureKind::SubmissionFailure => true,
            FailureKind::EnvironmentMismatch => true,
            FailureKind::InsufficientFunds => false,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a swap attempt ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SwapFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// The step a chain error surfaced in; drives classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Quote,
    BalanceCheck,
    AllowanceRead,
    Approval,
    Submission,
    Confirmation,
}

impl SwapFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a chain error raised during `stage`
    pub fn classify(stage: FailureStage, error: &ChainError) -> Self {
        let kind = match (stage, error) {
            (_, ChainError::UserRejected(_)) => FailureKind::UserRejected,
            (FailureStage::Quote, _) => FailureKind::QuoteFailure,
            (FailureStage::BalanceCheck | FailureStage::AllowanceRead, _) => {
                FailureKind::EnvironmentMismatch
            }
            (FailureStage::Approval, _) => FailureKind::ApprovalFailure,
            (FailureStage::Submission, ChainError::InsufficientFunds(_)) => {
                FailureKind::InsufficientFunds
            }
            (FailureStage::Submission | FailureStage::Confirmation, e)
                if e.is_allowance_failure() =>
            {
                FailureKind::EnvironmentMismatch
            }
            (FailureStage::Submission | FailureStage::Confirmation, ChainError::Rpc(_)) => {
                FailureKind::EnvironmentMismatch
            }
            (FailureStage::Submission | FailureStage::Confirmation, _) => {
                FailureKind::SubmissionFailure
            }
        };
        Self::new(kind, error.message())
    }

    /// Blocking notification text: "Swap failed: <class>: <message>"
    pub fn user_message(&self) -> String {
        if self.message.is_empty() {
            format!("Swap failed: {}", self.kind.description())
        } else {
            format!("Swap failed: {}: {}", self.kind.description(), self.message)
        }
    }
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Read { path: String, error: String },

    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: String, error: String },

    #[error("Invalid config field '{field}': {reason}")]
    Invalid { field: String, reason: String },

    #[error("Missing configuration: {0}")]
    Missing(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// LIBRARY ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    #[error("Invalid swap request: {0}")]
    InvalidIntent(String),

    #[error("No quote available, request a quote first")]
    NoQuote,

    #[error("A swap is already in flight for {0}")]
    AttemptInFlight(Address),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error(transparent)]
    Failed(#[from] SwapFailure),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl SwapError {
    /// The classified failure, when the error ended an attempt
    pub fn failure(&self) -> Option<&SwapFailure> {
        match self {
            SwapError::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_wins_over_stage() {
        let rejected = ChainError::UserRejected("User rejected the request.".into());
        for stage in [
            FailureStage::Approval,
            FailureStage::Submission,
            FailureStage::Confirmation,
        ] {
            assert_eq!(
                SwapFailure::classify(stage, &rejected).kind,
                FailureKind::UserRejected
            );
        }
    }

    #[test]
    fn stage_decides_class_for_generic_errors() {
        let reverted = ChainError::Reverted("execution reverted".into());
        assert_eq!(
            SwapFailure::classify(FailureStage::Quote, &reverted).kind,
            FailureKind::QuoteFailure
        );
        assert_eq!(
            SwapFailure::classify(FailureStage::Approval, &reverted).kind,
            FailureKind::ApprovalFailure
        );
        assert_eq!(
            SwapFailure::classify(FailureStage::Confirmation, &reverted).kind,
            FailureKind::SubmissionFailure
        );
        assert_eq!(
            SwapFailure::classify(FailureStage::AllowanceRead, &ChainError::Rpc("timeout".into()))
                .kind,
            FailureKind::EnvironmentMismatch
        );
    }

    #[test]
    fn swap_reverting_on_allowance_is_environment_mismatch() {
        let reverted = ChainError::Reverted("execution reverted: AllowanceExpired(0)".into());
        assert_eq!(
            SwapFailure::classify(FailureStage::Confirmation, &reverted).kind,
            FailureKind::EnvironmentMismatch
        );
    }

    #[test]
    fn node_insufficient_funds_on_submission() {
        let err = ChainError::InsufficientFunds("insufficient funds for gas".into());
        let failure = SwapFailure::classify(FailureStage::Submission, &err);
        assert_eq!(failure.kind, FailureKind::InsufficientFunds);
        assert!(!failure.kind.is_recoverable());
        assert_eq!(
            failure.user_message(),
            "Swap failed: Insufficient funds for transaction: insufficient funds for gas"
        );
    }
}
