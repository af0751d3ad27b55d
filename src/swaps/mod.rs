//! Swap flow against a Uniswap v4 pool through the Universal Router
//!
//! - [`quote`]: expected output via the v4 quoter
//! - [`allowance`]: Permit2 and router allowance checks and approvals
//! - [`plan`]: router call encoding
//! - [`orchestrator`]: the state machine driving one attempt

pub mod allowance;
pub mod config;
pub mod guard;
pub mod orchestrator;
pub mod plan;
pub mod quote;
pub mod state;
pub mod types;


pub use allowance::{AllowanceManager, ApprovalPlan, ApprovalStep};
pub use guard::SignerSlotGuard;
pub use orchestrator::SwapOrchestrator;
pub use plan::{amount_out_minimum, SwapPlan, SwapPlanBuilder};
pub use quote::QuoteService;
pub use state::{transition, InvalidTransition, SwapEvent, SwapExecutionState};
pub use types::{Quote, SwapIntent, SwapOutcome};
