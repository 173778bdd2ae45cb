//! Ecosystem Constants
//!
//! Pallet ids and economic parameters shared by the liquidity network and the
//! protocol token migrator. Runtime configurations and test mocks re-use these
//! through the primitives crate.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Identifier of a concentrated-liquidity position NFT held by the position ledger
pub type PositionId = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// Used with `PalletId::into_account_truncating()` to derive the engine and
/// migrator accounts.
pub mod pallet_ids {
  /// Liquidity Network pallet ID (position custody and compounding engine)
  pub const LIQUIDITY_NETWORK_PALLET_ID: &[u8; 8] = b"rexlqnet";

  /// Protocol Token pallet ID (legacy token burn sink and migrator)
  pub const PROTOCOL_TOKEN_PALLET_ID: &[u8; 8] = b"rexmigr0";
}

/// Ecosystem parameters defining mathematical constants and thresholds.
pub mod params {
  use super::Balance;
  use sp_arithmetic::Permill;

  /// Precision scalar for price calculations (10^12).
  pub const PRECISION: Balance = 1_000_000_000_000;

  /// Default minimum interval between two compounds of the same position, in seconds.
  pub const DEFAULT_COMPOUND_INTERVAL_SECS: u64 = 60;

  /// Default slippage tolerance applied to rebalancing swaps (1%).
  pub const DEFAULT_SLIPPAGE_TOLERANCE: Permill = Permill::from_percent(1);

  /// Surplus below this amount is not swapped during rebalancing.
  pub const DEFAULT_DUST_THRESHOLD: Balance = 1_000;

  /// Blocks to wait before retrying a failed automation registration.
  pub const AUTOMATION_RETRY_COOLDOWN: u32 = 10;

  /// Maximum automation registrations retried per `on_idle`.
  pub const MAX_REGISTRATION_RETRIES_PER_BLOCK: u32 = 8;
}
