//! Adapter traits for the liquidity network pallet
//!
//! The position ledger, the automation network, the swap router and the
//! self-compounder are external collaborators. The runtime binds each of them
//! through one trait so the pallet stays independent of their implementation.

use frame::prelude::*;
use primitives::{ModuleData, PositionId, TaskId};

/// Acknowledgement returned by a position receiver so the ledger completes the transfer
pub const ON_POSITION_RECEIVED_SELECTOR: [u8; 4] = [0x15, 0x0b, 0x7a, 0x02];

/// Snapshot of a position as reported by the ledger
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct PositionInfo {
  pub token0: u32,
  pub token1: u32,
  pub liquidity: u128,
  pub tokens_owed0: u128,
  pub tokens_owed1: u128,
}

/// Concentrated-liquidity position ledger (NFT position manager).
pub trait PositionLedger<AccountId> {
  /// Account the ledger acts as when it invokes a receiver hook
  fn ledger_account() -> AccountId;

  fn owner_of(position_id: PositionId) -> Option<AccountId>;

  fn position(position_id: PositionId) -> Option<PositionInfo>;

  /// Token amounts one unit of liquidity requires at the current pool price.
  ///
  /// `(0, r1)` or `(r0, 0)` when the price is outside the position range.
  fn deposit_ratio(position_id: PositionId) -> Option<(u128, u128)>;

  /// Collect owed fees of `position_id` to `who`, capped per token
  fn collect(
    who: &AccountId,
    position_id: PositionId,
    amount0_max: u128,
    amount1_max: u128,
  ) -> Result<(u128, u128), DispatchError>;

  /// Returns `(liquidity_added, amount0_used, amount1_used)`
  fn increase_liquidity(
    who: &AccountId,
    position_id: PositionId,
    amount0_desired: u128,
    amount1_desired: u128,
    amount0_min: u128,
    amount1_min: u128,
  ) -> Result<(u128, u128, u128), DispatchError>;

  /// Transfer ownership, invoking the receiver hook when `to` is a registered receiver
  fn safe_transfer_from(
    operator: &AccountId,
    from: &AccountId,
    to: &AccountId,
    position_id: PositionId,
    data: &[u8],
  ) -> DispatchResult;
}

/// Receiver hook called by the ledger when a position is transferred to the implementer.
pub trait PositionReceiver<AccountId> {
  fn on_position_received(
    caller: &AccountId,
    operator: &AccountId,
    from: &AccountId,
    position_id: PositionId,
    data: &[u8],
  ) -> Result<[u8; 4], DispatchError>;
}

/// Automation network accepting recurring tasks and later executing them for a fee.
pub trait AutomationNetwork<AccountId, Call> {
  fn create_task(
    creator: &AccountId,
    call: Call,
    module_data: ModuleData,
  ) -> Result<TaskId, DispatchError>;

  fn cancel_task(creator: &AccountId, task_id: TaskId) -> DispatchResult;

  fn is_active(task_id: TaskId) -> bool;
}

/// Token swap router used for rebalancing.
pub trait SwapRouter<AccountId> {
  /// Spot quote of `amount_in` of `asset_in` in units of `asset_out`
  fn quote(asset_in: u32, asset_out: u32, amount_in: u128) -> Option<u128>;

  fn swap_exact_in(
    who: &AccountId,
    asset_in: u32,
    asset_out: u32,
    amount_in: u128,
    min_amount_out: u128,
  ) -> Result<u128, DispatchError>;
}

/// External self-compounding vault positions can be pulled out of.
pub trait SelfCompounder<AccountId> {
  /// Withdraw `position_id` deposited by `owner` and send it to `to`
  fn withdraw_token(owner: &AccountId, position_id: PositionId, to: &AccountId) -> DispatchResult;
}

/// No self-compounder configured.
impl<AccountId> SelfCompounder<AccountId> for () {
  fn withdraw_token(_: &AccountId, _: PositionId, _: &AccountId) -> DispatchResult {
    Err(DispatchError::Other("SelfCompounder not configured"))
  }
}

/// No swap router configured: quotes are unavailable and swaps fail.
impl<AccountId> SwapRouter<AccountId> for () {
  fn quote(_: u32, _: u32, _: u128) -> Option<u128> {
    None
  }

  fn swap_exact_in(_: &AccountId, _: u32, _: u32, _: u128, _: u128) -> Result<u128, DispatchError> {
    Err(DispatchError::Other("SwapRouter not configured"))
  }
}
