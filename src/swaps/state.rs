/// Swap execution state machine
///
/// The orchestrator's progress is a single explicit value; every change goes
/// through [`transition`], which rejects moves the flow does not allow.
use crate::errors::SwapFailure;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum SwapExecutionState {
    #[default]
    Idle,
    FetchingQuote,
    QuoteReady,
    CheckingBalance,
    ApprovingTransferProxy,
    ApprovingRouterAllowance,
    BuildingPlan,
    Submitting,
    Confirming,
    Succeeded,
    Failed(SwapFailure),
}

impl SwapExecutionState {
    pub fn name(&self) -> &'static str {
        match self {
            SwapExecutionState::Idle => "Idle",
            SwapExecutionState::FetchingQuote => "FetchingQuote",
            SwapExecutionState::QuoteReady => "QuoteReady",
            SwapExecutionState::CheckingBalance => "CheckingBalance",
            SwapExecutionState::ApprovingTransferProxy => "ApprovingTransferProxy",
            SwapExecutionState::ApprovingRouterAllowance => "ApprovingRouterAllowance",
            SwapExecutionState::BuildingPlan => "BuildingPlan",
            SwapExecutionState::Submitting => "Submitting",
            SwapExecutionState::Confirming => "Confirming",
            SwapExecutionState::Succeeded => "Succeeded",
            SwapExecutionState::Failed(_) => "Failed",
        }
    }

    /// Status line shown while the state is current
    pub fn label(&self) -> String {
        match self {
            SwapExecutionState::Idle => "Enter an amount".to_string(),
            SwapExecutionState::FetchingQuote => "Fetching quote...".to_string(),
            SwapExecutionState::QuoteReady => "Ready to swap".to_string(),
            SwapExecutionState::CheckingBalance => "Checking balance...".to_string(),
            SwapExecutionState::ApprovingTransferProxy => "Approving Permit2...".to_string(),
            SwapExecutionState::ApprovingRouterAllowance => "Approving router...".to_string(),
            SwapExecutionState::BuildingPlan => "Preparing swap...".to_string(),
            SwapExecutionState::Submitting => "Waiting for signature...".to_string(),
            SwapExecutionState::Confirming => "Confirming swap...".to_string(),
            SwapExecutionState::Succeeded => "Swap successful".to_string(),
            SwapExecutionState::Failed(failure) => failure.user_message(),
        }
    }

    /// Work is underway and the attempt has not reached an end state
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SwapExecutionState::FetchingQuote
                | SwapExecutionState::CheckingBalance
                | SwapExecutionState::ApprovingTransferProxy
                | SwapExecutionState::ApprovingRouterAllowance
                | SwapExecutionState::BuildingPlan
                | SwapExecutionState::Submitting
                | SwapExecutionState::Confirming
        )
    }

    /// Once an approval or the swap may have been signed the attempt can no
    /// longer be abandoned
    pub fn can_reset(&self) -> bool {
        matches!(
            self,
            SwapExecutionState::Idle
                | SwapExecutionState::FetchingQuote
                | SwapExecutionState::QuoteReady
                | SwapExecutionState::CheckingBalance
                | SwapExecutionState::Succeeded
                | SwapExecutionState::Failed(_)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SwapExecutionState::Succeeded | SwapExecutionState::Failed(_)
        )
    }
}

impl std::fmt::Display for SwapExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapEvent {
    QuoteRequested,
    QuoteReceived,
    ExecuteRequested,
    TransferProxyApprovalRequired,
    RouterApprovalRequired,
    AllowancesReady,
    PlanBuilt,
    Submitted,
    Confirmed,
    Failed(SwapFailure),
    Reset,
}

impl SwapEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SwapEvent::QuoteRequested => "QuoteRequested",
            SwapEvent::QuoteReceived => "QuoteReceived",
            SwapEvent::ExecuteRequested => "ExecuteRequested",
            SwapEvent::TransferProxyApprovalRequired => "TransferProxyApprovalRequired",
            SwapEvent::RouterApprovalRequired => "RouterApprovalRequired",
            SwapEvent::AllowancesReady => "AllowancesReady",
            SwapEvent::PlanBuilt => "PlanBuilt",
            SwapEvent::Submitted => "Submitted",
            SwapEvent::Confirmed => "Confirmed",
            SwapEvent::Failed(_) => "Failed",
            SwapEvent::Reset => "Reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid transition: {event} while {from}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub event: &'static str,
}

impl InvalidTransition {
    pub fn new(from: &SwapExecutionState, event: &'static str) -> Self {
        Self {
            from: from.name(),
            event,
        }
    }
}

/// Next state for `event` in `state`
pub fn transition(
    state: &SwapExecutionState,
    event: SwapEvent,
) -> Result<SwapExecutionState, InvalidTransition> {
    use SwapExecutionState as S;

    let next = match (state, &event) {
        (S::Idle, SwapEvent::QuoteRequested) => S::FetchingQuote,
        (S::FetchingQuote, SwapEvent::QuoteReceived) => S::QuoteReady,
        (S::QuoteReady, SwapEvent::ExecuteRequested) => S::CheckingBalance,
        (S::CheckingBalance, SwapEvent::TransferProxyApprovalRequired) => {
            S::ApprovingTransferProxy
        }
        (
            S::CheckingBalance | S::ApprovingTransferProxy,
            SwapEvent::RouterApprovalRequired,
        ) => S::ApprovingRouterAllowance,
        (
            S::CheckingBalance | S::ApprovingTransferProxy | S::ApprovingRouterAllowance,
            SwapEvent::AllowancesReady,
        ) => S::BuildingPlan,
        (S::BuildingPlan, SwapEvent::PlanBuilt) => S::Submitting,
        (S::Submitting, SwapEvent::Submitted) => S::Confirming,
        (S::Confirming, SwapEvent::Confirmed) => S::Succeeded,
        (from, SwapEvent::Failed(failure)) if from.is_in_flight() => S::Failed(failure.clone()),
        (from, SwapEvent::Reset) if from.can_reset() => S::Idle,
        _ => return Err(InvalidTransition::new(state, event.name())),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;

    fn failure() -> SwapFailure {
        SwapFailure::new(FailureKind::QuoteFailure, "execution reverted")
    }

    fn run(events: Vec<SwapEvent>) -> Result<SwapExecutionState, InvalidTransition> {
        events
            .into_iter()
            .try_fold(SwapExecutionState::Idle, |state, event| transition(&state, event))
    }

    #[test]
    fn full_path_with_both_approvals() {
        let end = run(vec![
            SwapEvent::QuoteRequested,
            SwapEvent::QuoteReceived,
            SwapEvent::ExecuteRequested,
            SwapEvent::TransferProxyApprovalRequired,
            SwapEvent::RouterApprovalRequired,
            SwapEvent::AllowancesReady,
            SwapEvent::PlanBuilt,
            SwapEvent::Submitted,
            SwapEvent::Confirmed,
        ]);
        assert_eq!(end, Ok(SwapExecutionState::Succeeded));
    }

    #[test]
    fn approvals_can_be_skipped() {
        let end = run(vec![
            SwapEvent::QuoteRequested,
            SwapEvent::QuoteReceived,
            SwapEvent::ExecuteRequested,
            SwapEvent::AllowancesReady,
        ]);
        assert_eq!(end, Ok(SwapExecutionState::BuildingPlan));
    }

    #[test]
    fn failure_only_from_in_flight_states() {
        let failed = transition(
            &SwapExecutionState::FetchingQuote,
            SwapEvent::Failed(failure()),
        )
        .unwrap();
        assert_eq!(failed, SwapExecutionState::Failed(failure()));
        assert!(failed.is_terminal());

        assert!(transition(&SwapExecutionState::Idle, SwapEvent::Failed(failure())).is_err());
        assert!(transition(&SwapExecutionState::Succeeded, SwapEvent::Failed(failure())).is_err());
    }

    #[test]
    fn no_reset_once_a_transaction_may_be_pending() {
        for state in [
            SwapExecutionState::ApprovingTransferProxy,
            SwapExecutionState::ApprovingRouterAllowance,
            SwapExecutionState::BuildingPlan,
            SwapExecutionState::Submitting,
            SwapExecutionState::Confirming,
        ] {
            let err = transition(&state, SwapEvent::Reset).unwrap_err();
            assert_eq!(err.event, "Reset");
            assert_eq!(err.from, state.name());
        }

        for state in [
            SwapExecutionState::QuoteReady,
            SwapExecutionState::Succeeded,
            SwapExecutionState::Failed(failure()),
        ] {
            assert_eq!(
                transition(&state, SwapEvent::Reset),
                Ok(SwapExecutionState::Idle)
            );
        }
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        assert!(transition(&SwapExecutionState::Idle, SwapEvent::ExecuteRequested).is_err());
        assert!(transition(&SwapExecutionState::QuoteReady, SwapEvent::QuoteRequested).is_err());
        assert!(transition(
            &SwapExecutionState::ApprovingRouterAllowance,
            SwapEvent::TransferProxyApprovalRequired
        )
        .is_err());
        assert!(transition(&SwapExecutionState::Confirming, SwapEvent::PlanBuilt).is_err());
    }
}
