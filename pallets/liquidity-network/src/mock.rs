extern crate alloc;

use crate as pallet_liquidity_network;
use crate::{ON_POSITION_RECEIVED_SELECTOR, PositionInfo, PositionReceiver};
use alloc::vec::Vec;
use codec::Encode;
use polkadot_sdk::frame_support::traits::fungible::Mutate as NativeMutate;
use polkadot_sdk::frame_support::traits::fungibles::Mutate;
use polkadot_sdk::frame_support::traits::tokens::{Fortitude, Precision, Preservation};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get, SortedMembers},
};
use polkadot_sdk::frame_system::{self, EnsureRoot, EnsureSignedBy};
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult, Permill,
  testing::H256,
  traits::{BlakeTwo256, Dispatchable, IdentityLookup},
};
use primitives::ecosystem::params::{
  AUTOMATION_RETRY_COOLDOWN, DEFAULT_COMPOUND_INTERVAL_SECS, DEFAULT_DUST_THRESHOLD,
  MAX_REGISTRATION_RETRIES_PER_BLOCK, PRECISION,
};
use primitives::{ModuleData, Moment, PositionId, TaskId, well_known};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub type AccountId = u64;
pub type Balance = u128;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;
/// Account the position ledger calls the receiver hook as
pub const LEDGER_ACCOUNT: AccountId = 50;
/// Rogue NFT contract trying to push positions into the engine
pub const ROGUE_LEDGER: AccountId = 51;
pub const SELF_COMPOUNDER: AccountId = 60;
pub const AUTOMATION_EXECUTOR: AccountId = 99;
pub const FEE_COLLECTOR: AccountId = 98;

pub const TOKEN0: u32 = well_known::USDC;
pub const TOKEN1: u32 = well_known::WMATIC;

pub const UNIT: Balance = 1_000_000_000_000;
pub const INITIAL_NATIVE: Balance = 1_000 * UNIT;
/// Wall clock at genesis of every test, in seconds
pub const START_TIME: Moment = 1_700_000_000;
pub const MAX_POSITIONS: u32 = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockPosition {
  pub owner: AccountId,
  pub token0: u32,
  pub token1: u32,
  pub liquidity: u128,
  pub owed0: u128,
  pub owed1: u128,
  /// Token amounts one unit of liquidity takes
  pub ratio: (u128, u128),
}

#[derive(Clone, Debug)]
pub struct MockTask {
  pub creator: AccountId,
  pub call: RuntimeCall,
  pub module_data: ModuleData,
  pub last_exec: Option<Moment>,
}

// State containers for stateful mocks
thread_local! {
  // Position ledger: position id -> position
  pub static LEDGER: RefCell<BTreeMap<PositionId, MockPosition>> = const { RefCell::new(BTreeMap::new()) };
  static NEXT_POSITION_ID: RefCell<PositionId> = const { RefCell::new(1) };

  // Automation network: task id -> task
  pub static TASKS: RefCell<BTreeMap<TaskId, MockTask>> = const { RefCell::new(BTreeMap::new()) };
  static TASK_NONCE: RefCell<u64> = const { RefCell::new(0) };
  // Registration is refused while set (e.g. task fees not funded)
  static AUTOMATION_REJECTS: RefCell<bool> = const { RefCell::new(false) };
  // Pre-paid task treasury per creator
  static TASK_TREASURY: RefCell<BTreeMap<AccountId, Balance>> = const { RefCell::new(BTreeMap::new()) };

  // AMM Pools: (AssetA, AssetB) -> (ReserveA, ReserveB), key sorted
  pub static POOLS: RefCell<BTreeMap<(u32, u32), (u128, u128)>> = const { RefCell::new(BTreeMap::new()) };

  // Self-compounder vault: position id -> depositor
  static VAULT: RefCell<BTreeMap<PositionId, AccountId>> = const { RefCell::new(BTreeMap::new()) };
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    Timestamp: polkadot_sdk::pallet_timestamp,
    LiquidityNetwork: pallet_liquidity_network,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<Balance>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = Balance;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = Balance;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

impl polkadot_sdk::pallet_timestamp::Config for Test {
  type Moment = u64;
  type OnTimestampSet = ();
  type MinimumPeriod = ConstU64<1>;
  type WeightInfo = ();
}

// Position ledger helpers

/// Mint a fresh position owned by `owner` with a 1:1 deposit ratio
pub fn mint_position(owner: AccountId) -> PositionId {
  let id = NEXT_POSITION_ID.with(|n| {
    let mut next = n.borrow_mut();
    let id = *next;
    *next += 1;
    id
  });
  LEDGER.with(|l| {
    l.borrow_mut().insert(
      id,
      MockPosition {
        owner,
        token0: TOKEN0,
        token1: TOKEN1,
        liquidity: 1_000_000,
        owed0: 0,
        owed1: 0,
        ratio: (1, 1),
      },
    )
  });
  id
}

pub fn accrue_fees(position_id: PositionId, owed0: u128, owed1: u128) {
  LEDGER.with(|l| {
    if let Some(position) = l.borrow_mut().get_mut(&position_id) {
      position.owed0 += owed0;
      position.owed1 += owed1;
    }
  });
}

pub fn set_deposit_ratio(position_id: PositionId, ratio0: u128, ratio1: u128) {
  LEDGER.with(|l| {
    if let Some(position) = l.borrow_mut().get_mut(&position_id) {
      position.ratio = (ratio0, ratio1);
    }
  });
}

pub fn ledger_position(position_id: PositionId) -> Option<MockPosition> {
  LEDGER.with(|l| l.borrow().get(&position_id).cloned())
}

fn set_owner(position_id: PositionId, owner: AccountId) {
  LEDGER.with(|l| {
    if let Some(position) = l.borrow_mut().get_mut(&position_id) {
      position.owner = owner;
    }
  });
}

/// Deposit through the ledger, as a holder calling `safeTransferFrom` to the engine would
pub fn deposit(who: AccountId, position_id: PositionId) -> DispatchResult {
  <MockLedger as crate::PositionLedger<AccountId>>::safe_transfer_from(
    &who,
    &who,
    &LiquidityNetwork::account_id(),
    position_id,
    &[],
  )
}

pub struct MockLedger;
impl crate::PositionLedger<AccountId> for MockLedger {
  fn ledger_account() -> AccountId {
    LEDGER_ACCOUNT
  }

  fn owner_of(position_id: PositionId) -> Option<AccountId> {
    ledger_position(position_id).map(|p| p.owner)
  }

  fn position(position_id: PositionId) -> Option<PositionInfo> {
    ledger_position(position_id).map(|p| PositionInfo {
      token0: p.token0,
      token1: p.token1,
      liquidity: p.liquidity,
      tokens_owed0: p.owed0,
      tokens_owed1: p.owed1,
    })
  }

  fn deposit_ratio(position_id: PositionId) -> Option<(u128, u128)> {
    ledger_position(position_id).map(|p| p.ratio)
  }

  fn collect(
    who: &AccountId,
    position_id: PositionId,
    amount0_max: u128,
    amount1_max: u128,
  ) -> Result<(u128, u128), DispatchError> {
    let (token0, token1, amount0, amount1) = LEDGER.with(|l| {
      let mut ledger = l.borrow_mut();
      let position = ledger
        .get_mut(&position_id)
        .ok_or(DispatchError::Other("Invalid token ID"))?;
      if position.owner != *who {
        return Err(DispatchError::Other("Not approved"));
      }
      let amount0 = position.owed0.min(amount0_max);
      let amount1 = position.owed1.min(amount1_max);
      position.owed0 -= amount0;
      position.owed1 -= amount1;
      Ok((position.token0, position.token1, amount0, amount1))
    })?;
    if amount0 > 0 {
      <Assets as Mutate<AccountId>>::mint_into(token0, who, amount0)?;
    }
    if amount1 > 0 {
      <Assets as Mutate<AccountId>>::mint_into(token1, who, amount1)?;
    }
    Ok((amount0, amount1))
  }

  fn increase_liquidity(
    who: &AccountId,
    position_id: PositionId,
    amount0_desired: u128,
    amount1_desired: u128,
    amount0_min: u128,
    amount1_min: u128,
  ) -> Result<(u128, u128, u128), DispatchError> {
    let position = ledger_position(position_id).ok_or(DispatchError::Other("Invalid token ID"))?;
    if position.owner != *who {
      return Err(DispatchError::Other("Not approved"));
    }
    let (ratio0, ratio1) = position.ratio;
    // Dust that does not make up one unit of liquidity is left unused
    let liquidity = match (ratio0, ratio1) {
      (0, 0) => 0,
      (0, r1) => amount1_desired / r1,
      (r0, 0) => amount0_desired / r0,
      (r0, r1) => (amount0_desired / r0).min(amount1_desired / r1),
    };
    let used0 = liquidity * ratio0;
    let used1 = liquidity * ratio1;
    if used0 < amount0_min || used1 < amount1_min {
      return Err(DispatchError::Other("Price slippage check"));
    }
    if used0 > 0 {
      <Assets as Mutate<AccountId>>::burn_from(
        position.token0,
        who,
        used0,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
    }
    if used1 > 0 {
      <Assets as Mutate<AccountId>>::burn_from(
        position.token1,
        who,
        used1,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
    }
    LEDGER.with(|l| {
      if let Some(p) = l.borrow_mut().get_mut(&position_id) {
        p.liquidity += liquidity;
      }
    });
    Ok((liquidity, used0, used1))
  }

  fn safe_transfer_from(
    operator: &AccountId,
    from: &AccountId,
    to: &AccountId,
    position_id: PositionId,
    data: &[u8],
  ) -> DispatchResult {
    let position = ledger_position(position_id).ok_or(DispatchError::Other("Invalid token ID"))?;
    if position.owner != *from || operator != from {
      return Err(DispatchError::Other("Not approved"));
    }
    set_owner(position_id, *to);
    if *to == LiquidityNetwork::account_id() {
      let ack = <LiquidityNetwork as PositionReceiver<AccountId>>::on_position_received(
        &LEDGER_ACCOUNT,
        operator,
        from,
        position_id,
        data,
      );
      match ack {
        Ok(selector) if selector == ON_POSITION_RECEIVED_SELECTOR => {}
        Ok(_) => {
          set_owner(position_id, *from);
          return Err(DispatchError::Other("Transfer to non receiver"));
        }
        Err(e) => {
          set_owner(position_id, *from);
          return Err(e);
        }
      }
    }
    Ok(())
  }
}

// Automation network helpers

pub fn set_automation_rejecting(rejecting: bool) {
  AUTOMATION_REJECTS.with(|r| *r.borrow_mut() = rejecting);
}

pub fn automation_task(task_id: TaskId) -> Option<MockTask> {
  TASKS.with(|t| t.borrow().get(&task_id).cloned())
}

pub fn active_task_count() -> usize {
  TASKS.with(|t| t.borrow().len())
}

pub fn deposit_task_treasury(who: AccountId, amount: Balance) {
  TASK_TREASURY.with(|t| *t.borrow_mut().entry(who).or_default() += amount);
}

pub fn task_treasury(who: AccountId) -> Balance {
  TASK_TREASURY.with(|t| t.borrow().get(&who).copied().unwrap_or(0))
}

/// Execute a registered task the way the automation network executor does
///
/// The task is looked up from its creator, target call and module data. The stored call is
/// dispatched with the executor origin and the fee is charged to the creator, either from its
/// balance in `fee_token` (native when `None`) or from its pre-paid task treasury.
pub fn exec(
  task_creator: AccountId,
  exec_call: RuntimeCall,
  module_data: ModuleData,
  fee_amount: Balance,
  fee_token: Option<u32>,
  use_task_treasury_funds: bool,
  revert_on_failure: bool,
) -> DispatchResult {
  let (task_id, task) = TASKS
    .with(|t| {
      t.borrow()
        .iter()
        .find(|(_, task)| {
          task.creator == task_creator && task.call == exec_call && task.module_data == module_data
        })
        .map(|(id, task)| (*id, task.clone()))
    })
    .ok_or(DispatchError::Other("Automate: task not found"))?;

  let now = Timestamp::get() / 1_000;
  if !task.module_data.time.is_due(now, task.last_exec) {
    return Err(DispatchError::Other("Automate.preExecCall: TimeModule: Too early"));
  }

  let result = exec_call.dispatch(RuntimeOrigin::signed(AUTOMATION_EXECUTOR));
  if let Err(e) = result {
    if revert_on_failure {
      return Err(e.error);
    }
  }

  TASKS.with(|t| {
    if let Some(task) = t.borrow_mut().get_mut(&task_id) {
      task.last_exec = Some(now);
    }
  });

  if fee_amount == 0 {
    return Ok(());
  }
  if use_task_treasury_funds {
    return TASK_TREASURY.with(|t| {
      let mut treasury = t.borrow_mut();
      let credit = treasury.entry(task_creator).or_default();
      if *credit < fee_amount {
        return Err(DispatchError::Other("TaskTreasury: Not enough funds"));
      }
      *credit -= fee_amount;
      Ok(())
    });
  }
  match fee_token {
    None => {
      <Balances as NativeMutate<AccountId>>::transfer(
        &task_creator,
        &FEE_COLLECTOR,
        fee_amount,
        Preservation::Expendable,
      )?;
    }
    Some(asset) => {
      <Assets as Mutate<AccountId>>::transfer(
        asset,
        &task_creator,
        &FEE_COLLECTOR,
        fee_amount,
        Preservation::Expendable,
      )?;
    }
  }
  Ok(())
}

/// Execute the compounding task of a custodied position with the given native fee
pub fn exec_compound(position_id: PositionId, fee_amount: Balance) -> DispatchResult {
  let task_id = LiquidityNetwork::positions(position_id)
    .and_then(|record| record.task)
    .map(|task| task.task_id)
    .ok_or(DispatchError::Other("Automate: task not found"))?;
  let task = automation_task(task_id).ok_or(DispatchError::Other("Automate: task not found"))?;
  exec(
    LiquidityNetwork::account_id(),
    task.call,
    task.module_data,
    fee_amount,
    None,
    false,
    true,
  )
}

pub struct MockAutomation;
impl crate::AutomationNetwork<AccountId, RuntimeCall> for MockAutomation {
  fn create_task(
    creator: &AccountId,
    call: RuntimeCall,
    module_data: ModuleData,
  ) -> Result<TaskId, DispatchError> {
    if AUTOMATION_REJECTS.with(|r| *r.borrow()) {
      return Err(DispatchError::Other("Automate: task fees not funded"));
    }
    let nonce = TASK_NONCE.with(|n| {
      let mut nonce = n.borrow_mut();
      *nonce += 1;
      *nonce
    });
    let task_id = polkadot_sdk::sp_core::hashing::blake2_256(&(creator, nonce, &call).encode());
    TASKS.with(|t| {
      t.borrow_mut().insert(
        task_id,
        MockTask {
          creator: *creator,
          call,
          module_data,
          last_exec: None,
        },
      )
    });
    Ok(task_id)
  }

  fn cancel_task(creator: &AccountId, task_id: TaskId) -> DispatchResult {
    TASKS.with(|t| {
      let mut tasks = t.borrow_mut();
      match tasks.get(&task_id) {
        Some(task) if task.creator == *creator => {
          tasks.remove(&task_id);
          Ok(())
        }
        _ => Err(DispatchError::Other("Automate: task not found")),
      }
    })
  }

  fn is_active(task_id: TaskId) -> bool {
    TASKS.with(|t| t.borrow().contains_key(&task_id))
  }
}

// Swap router helpers

fn sorted_pair(a: u32, b: u32) -> (u32, u32) {
  if a < b { (a, b) } else { (b, a) }
}

/// Raise the minimum balance an account of `asset` must hold
pub fn set_min_balance(asset: u32, min_balance: Balance) {
  polkadot_sdk::frame_support::assert_ok!(Assets::force_asset_status(
    RuntimeOrigin::root(),
    asset,
    ALICE,
    ALICE,
    ALICE,
    ALICE,
    min_balance,
    true,
    false,
  ));
}

pub fn set_pool(asset_a: u32, asset_b: u32, reserve_a: u128, reserve_b: u128) {
  let key = sorted_pair(asset_a, asset_b);
  let reserves = if asset_a < asset_b {
    (reserve_a, reserve_b)
  } else {
    (reserve_b, reserve_a)
  };
  POOLS.with(|p| p.borrow_mut().insert(key, reserves));
}

fn reserves(asset_in: u32, asset_out: u32) -> Option<(u128, u128)> {
  let (res_a, res_b) = POOLS.with(|p| p.borrow().get(&sorted_pair(asset_in, asset_out)).cloned())?;
  Some(if asset_in < asset_out {
    (res_a, res_b)
  } else {
    (res_b, res_a)
  })
}

pub struct MockRouter;
impl crate::SwapRouter<AccountId> for MockRouter {
  fn quote(asset_in: u32, asset_out: u32, amount_in: u128) -> Option<u128> {
    if asset_in == asset_out {
      return Some(amount_in);
    }
    let (reserve_in, reserve_out) = reserves(asset_in, asset_out)?;
    if reserve_in == 0 || reserve_out == 0 {
      return None;
    }
    Some(amount_in.saturating_mul(reserve_out) / reserve_in)
  }

  fn swap_exact_in(
    who: &AccountId,
    asset_in: u32,
    asset_out: u32,
    amount_in: u128,
    min_amount_out: u128,
  ) -> Result<u128, DispatchError> {
    let (reserve_in, reserve_out) =
      reserves(asset_in, asset_out).ok_or(DispatchError::Other("Pool not found"))?;
    if reserve_in == 0 || reserve_out == 0 {
      return Err(DispatchError::Other("Empty reserves"));
    }

    // XYK Swap Math: y_out = (x_in * y_res) / (x_res + x_in)
    let amount_out =
      (amount_in.saturating_mul(reserve_out)) / (reserve_in.saturating_add(amount_in));
    if amount_out < min_amount_out {
      return Err(DispatchError::Other("Too little received"));
    }

    set_pool(
      asset_in,
      asset_out,
      reserve_in.saturating_add(amount_in),
      reserve_out.saturating_sub(amount_out),
    );

    <Assets as Mutate<AccountId>>::burn_from(
      asset_in,
      who,
      amount_in,
      Preservation::Expendable,
      Precision::Exact,
      Fortitude::Polite,
    )?;
    <Assets as Mutate<AccountId>>::mint_into(asset_out, who, amount_out)?;

    Ok(amount_out)
  }
}

// Self-compounder helpers

/// Move `position_id` from `owner` into the self-compounder vault
pub fn stake_in_self_compounder(owner: AccountId, position_id: PositionId) -> DispatchResult {
  let position = ledger_position(position_id).ok_or(DispatchError::Other("Invalid token ID"))?;
  if position.owner != owner {
    return Err(DispatchError::Other("Not approved"));
  }
  set_owner(position_id, SELF_COMPOUNDER);
  VAULT.with(|v| v.borrow_mut().insert(position_id, owner));
  Ok(())
}

pub struct MockSelfCompounder;
impl crate::SelfCompounder<AccountId> for MockSelfCompounder {
  fn withdraw_token(owner: &AccountId, position_id: PositionId, to: &AccountId) -> DispatchResult {
    VAULT.with(|v| {
      let mut vault = v.borrow_mut();
      match vault.get(&position_id) {
        Some(depositor) if depositor == owner => {
          vault.remove(&position_id);
          Ok(())
        }
        _ => Err(DispatchError::Other("Not the depositor")),
      }
    })?;
    set_owner(position_id, *to);
    Ok(())
  }
}

pub struct AutomationExecutors;
impl SortedMembers<AccountId> for AutomationExecutors {
  fn sorted_members() -> Vec<AccountId> {
    alloc::vec![AUTOMATION_EXECUTOR]
  }
}

pub struct LiquidityNetworkPalletId;
impl Get<PalletId> for LiquidityNetworkPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::ecosystem::pallet_ids::LIQUIDITY_NETWORK_PALLET_ID)
  }
}

pub struct SlippageToleranceStub;
impl Get<Permill> for SlippageToleranceStub {
  fn get() -> Permill {
    primitives::ecosystem::params::DEFAULT_SLIPPAGE_TOLERANCE
  }
}

impl pallet_liquidity_network::Config for Test {
  type Assets = Assets;
  type Currency = Balances;
  type PositionLedger = MockLedger;
  type Automation = MockAutomation;
  type SwapRouter = MockRouter;
  type SelfCompounder = MockSelfCompounder;
  type TimeProvider = Timestamp;
  type AutomationOrigin = EnsureSignedBy<AutomationExecutors, AccountId>;
  type AdminOrigin = EnsureRoot<AccountId>;
  type PalletId = LiquidityNetworkPalletId;
  type MaxPositions = ConstU32<MAX_POSITIONS>;
  type DefaultCompoundInterval = ConstU64<DEFAULT_COMPOUND_INTERVAL_SECS>;
  type DefaultSlippageTolerance = SlippageToleranceStub;
  type DefaultDustThreshold = ConstU128<DEFAULT_DUST_THRESHOLD>;
  type Precision = ConstU128<PRECISION>;
  type RetryCooldown = ConstU64<{ AUTOMATION_RETRY_COOLDOWN as u64 }>;
  type MaxRetriesPerBlock = ConstU32<MAX_REGISTRATION_RETRIES_PER_BLOCK>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = LiquidityNetworkBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct LiquidityNetworkBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AccountId> for LiquidityNetworkBenchmarkHelper {
  fn create_position(
    owner: &AccountId,
    fees0: u128,
    fees1: u128,
  ) -> Result<PositionId, DispatchError> {
    let position_id = mint_position(*owner);
    accrue_fees(position_id, fees0, fees1);
    set_pool(TOKEN0, TOKEN1, 1_000_000 * UNIT, 1_000_000 * UNIT);
    Ok(position_id)
  }

  fn stake_in_self_compounder(owner: &AccountId, position_id: PositionId) -> DispatchResult {
    stake_in_self_compounder(*owner, position_id)
  }

  fn fund_native(who: &AccountId, amount: u128) -> DispatchResult {
    <Balances as NativeMutate<AccountId>>::mint_into(who, amount)?;
    Ok(())
  }
}

/// Move the wall clock to `secs` seconds
pub fn set_now(secs: Moment) {
  Timestamp::set_timestamp(secs * 1_000);
}

pub fn now() -> Moment {
  Timestamp::get() / 1_000
}

pub fn reset_mock_adapters() {
  LEDGER.with(|l| l.borrow_mut().clear());
  NEXT_POSITION_ID.with(|n| *n.borrow_mut() = 1);
  TASKS.with(|t| t.borrow_mut().clear());
  TASK_NONCE.with(|n| *n.borrow_mut() = 0);
  AUTOMATION_REJECTS.with(|r| *r.borrow_mut() = false);
  TASK_TREASURY.with(|t| t.borrow_mut().clear());
  POOLS.with(|p| p.borrow_mut().clear());
  VAULT.with(|v| v.borrow_mut().clear());
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: alloc::vec![
      (ALICE, INITIAL_NATIVE),
      (BOB, INITIAL_NATIVE),
      (CHARLIE, INITIAL_NATIVE),
      (FEE_COLLECTOR, 1),
    ],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    // (id, owner, is_sufficient, min_balance)
    assets: alloc::vec![(TOKEN0, ALICE, true, 1), (TOKEN1, ALICE, true, 1)],
    metadata: alloc::vec![],
    accounts: alloc::vec![],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  // Engine genesis: pallet account gets provider ref (ED-free)
  pallet_liquidity_network::GenesisConfig::<Test>::default()
    .assimilate_storage(&mut t)
    .unwrap();

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    reset_mock_adapters();
    System::set_block_number(1);
    set_now(START_TIME);
  });
  ext
}
