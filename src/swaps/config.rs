/// Swap flow parameters - hardcoded protocol constants
///
/// Contract addresses and pool parameters live in the configuration record;
/// these values are part of the flow itself.

// =============================================================================
// SLIPPAGE
// =============================================================================

/// Slippage tolerance applied to every quote (0.5%)
pub const SLIPPAGE_TOLERANCE_BPS: u32 = 50;

/// Basis points in one whole
pub const BPS_DENOMINATOR: u32 = 10_000;

// =============================================================================
// DEADLINES AND EXPIRATIONS (seconds)
// =============================================================================

/// Router execution deadline, measured from plan build time
pub const SWAP_DEADLINE_SECS: u64 = 3600;

/// A router allowance expiring sooner than this is renewed
pub const ROUTER_ALLOWANCE_EXPIRY_BUFFER_SECS: u64 = 3600;

/// Lifetime of a freshly granted router allowance (one year)
pub const ROUTER_ALLOWANCE_LIFETIME_SECS: u64 = 31_536_000;

// =============================================================================
// UNIVERSAL ROUTER ENCODING
// =============================================================================

/// Universal Router command executing a v4 action blob
pub const V4_SWAP_COMMAND: u8 = 0x10;

/// v4 periphery action codes
pub const ACTION_SWAP_EXACT_IN_SINGLE: u8 = 0x06;
pub const ACTION_SETTLE_ALL: u8 = 0x0c;
pub const ACTION_TAKE_ALL: u8 = 0x0f;

/// Hook data attached to the swap action
pub const SWAP_HOOK_DATA: [u8; 1] = [0x00];

/// Hook data attached to quotes
pub const QUOTE_HOOK_DATA: [u8; 0] = [];
