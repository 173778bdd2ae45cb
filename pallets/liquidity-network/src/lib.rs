//! Liquidity Network Pallet
//!
//! Custodial compounding engine for concentrated-liquidity position NFTs.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::{
  AutomationNetwork, ON_POSITION_RECEIVED_SELECTOR, PositionInfo, PositionLedger, PositionReceiver,
  SelfCompounder, SwapRouter,
};

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub(crate) const LOG_TARGET: &str = "runtime::liquidity-network";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  /// Mint a position owned by `owner` with `fees0`/`fees1` already owed
  fn create_position(
    owner: &AccountId,
    fees0: u128,
    fees1: u128,
  ) -> Result<primitives::PositionId, frame::deps::sp_runtime::DispatchError>;
  /// Park `position_id` in the self-compounder on behalf of `owner`
  fn stake_in_self_compounder(
    owner: &AccountId,
    position_id: primitives::PositionId,
  ) -> frame::deps::sp_runtime::DispatchResult;
  fn fund_native(who: &AccountId, amount: u128) -> frame::deps::sp_runtime::DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::{
    AutomationNetwork, LOG_TARGET, ON_POSITION_RECEIVED_SELECTOR, PositionLedger,
    PositionReceiver, SelfCompounder, SwapRouter, WeightInfo,
  };
  use alloc::vec::Vec;
  use frame::deps::{
    frame_support::{
      storage::with_storage_layer,
      traits::{
        UnixTime,
        fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
        fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
        tokens::{DepositConsequence, Preservation, Provenance, WithdrawConsequence},
      },
    },
    sp_runtime::{
      DispatchError, Permill,
      traits::{AccountIdConversion, Zero},
    },
  };
  use frame::prelude::*;
  use primitives::{ModuleData, Moment, PositionId, TaskId, TimeTrigger};

  /// Automation task bound to a custodied position
  #[derive(
    Clone,
    Copy,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub struct AutomationTask {
    pub task_id: TaskId,
    pub trigger: TimeTrigger,
  }

  /// Custody record of a deposited position
  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct PositionRecord<AccountId> {
    /// Account the position is returned to
    pub depositor: AccountId,
    pub token0: u32,
    pub token1: u32,
    pub task: Option<AutomationTask>,
    pub deposited_at: Moment,
    pub last_compounded_at: Option<Moment>,
    pub compound_count: u32,
    /// Harvested token0 not consumed by the last liquidity increase
    pub leftover0: u128,
    /// Harvested token1 not consumed by the last liquidity increase
    pub leftover1: u128,
  }

  pub type PositionRecordOf<T> = PositionRecord<<T as frame_system::Config>::AccountId>;

  /// Why a compound completed without reinvesting
  #[derive(
    Clone,
    Copy,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub enum SkipReason {
    /// Nothing was owed and no leftovers were carried
    NoFees,
  }

  /// Swap chosen to bring harvested amounts to the position's deposit ratio
  #[derive(Clone, Copy, Debug, Eq, PartialEq)]
  pub enum RebalanceSwap {
    /// Sell this much token0 for token1
    ZeroForOne(u128),
    /// Sell this much token1 for token0
    OneForZero(u128),
  }

  #[pallet::config]
  pub trait Config:
    frame_system::Config<RuntimeEvent: From<Event<Self>>, RuntimeCall: From<Call<Self>>>
  {
    /// Fungible assets holding the position tokens
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = u128>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = u128>;

    /// Native currency used to pre-fund automation fees
    type Currency: NativeInspect<Self::AccountId, Balance = u128>
      + NativeMutate<Self::AccountId, Balance = u128>;

    /// Concentrated-liquidity position ledger
    type PositionLedger: PositionLedger<Self::AccountId>;

    /// Automation network the compounding task is registered with
    type Automation: AutomationNetwork<Self::AccountId, <Self as frame_system::Config>::RuntimeCall>;

    /// Router used for rebalancing swaps
    type SwapRouter: SwapRouter<Self::AccountId>;

    /// Self-compounding vault positions can be imported from
    type SelfCompounder: SelfCompounder<Self::AccountId>;

    /// Wall clock in seconds for triggers and intervals
    type TimeProvider: UnixTime;

    /// Origin of the automation network executor, the only one allowed to compound
    type AutomationOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Origin that can perform governance operations
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// The pallet ID, the engine account is derived from it
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Maximum number of positions in custody
    #[pallet::constant]
    type MaxPositions: Get<u32>;

    /// Default minimum interval between two compounds, in seconds
    #[pallet::constant]
    type DefaultCompoundInterval: Get<u64>;

    /// Default slippage tolerance for rebalancing swaps
    #[pallet::constant]
    type DefaultSlippageTolerance: Get<Permill>;

    /// Default surplus below which rebalancing is skipped
    #[pallet::constant]
    type DefaultDustThreshold: Get<u128>;

    /// Precision for price calculations
    #[pallet::constant]
    type Precision: Get<u128>;

    /// Blocks to wait before retrying a failed automation registration
    #[pallet::constant]
    type RetryCooldown: Get<BlockNumberFor<Self>>;

    /// Maximum registrations retried in one `on_idle`
    #[pallet::constant]
    type MaxRetriesPerBlock: Get<u32>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  /// The pallet module, the place to define dispatchable calls, storage items, events, errors, etc.
  ///
  /// ## Custody
  /// Positions enter through the ledger's receiver hook and stay in custody until the depositor
  /// withdraws them. The engine account is the ledger owner of every custodied position.
  ///
  /// ## Automation
  /// Each deposit registers one time-triggered task calling `compound(position_id)`. A rejected
  /// registration never fails the deposit: the position is parked in `PendingRegistration` and
  /// retried from `on_idle` after `RetryCooldown` blocks.
  ///
  /// ## Compounding
  /// 1. **Collect**: Harvest all owed fees and add carried leftovers.
  /// 2. **Rebalance**: Swap the surplus side towards the position's deposit ratio.
  /// 3. **Reinvest**: Increase liquidity and carry unused amounts to the next round.
  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// Custody records by position id
  #[pallet::storage]
  #[pallet::getter(fn positions)]
  pub type Positions<T: Config> =
    StorageMap<_, Blake2_128Concat, PositionId, PositionRecordOf<T>, OptionQuery>;

  /// Custodied position ids in deposit order
  #[pallet::storage]
  #[pallet::getter(fn custody_set)]
  pub type CustodySet<T: Config> =
    StorageValue<_, BoundedVec<PositionId, T::MaxPositions>, ValueQuery>;

  /// Reverse index from automation task to position
  #[pallet::storage]
  #[pallet::getter(fn task_of)]
  pub type TaskOf<T: Config> = StorageMap<_, Blake2_128Concat, TaskId, PositionId, OptionQuery>;

  /// Positions whose automation registration failed, with the block of the next attempt
  #[pallet::storage]
  #[pallet::getter(fn pending_registration)]
  pub type PendingRegistration<T: Config> =
    StorageMap<_, Blake2_128Concat, PositionId, BlockNumberFor<T>, OptionQuery>;

  /// Current compound interval in seconds (can be updated by governance)
  #[pallet::storage]
  #[pallet::getter(fn compound_interval)]
  pub type CompoundInterval<T: Config> =
    StorageValue<_, u64, ValueQuery, T::DefaultCompoundInterval>;

  /// Current slippage tolerance (can be updated by governance)
  #[pallet::storage]
  #[pallet::getter(fn slippage_tolerance)]
  pub type SlippageTolerance<T: Config> =
    StorageValue<_, Permill, ValueQuery, T::DefaultSlippageTolerance>;

  /// Current dust threshold (can be updated by governance)
  #[pallet::storage]
  #[pallet::getter(fn dust_threshold)]
  pub type DustThreshold<T: Config> = StorageValue<_, u128, ValueQuery, T::DefaultDustThreshold>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Position taken into custody
    PositionDeposited {
      position_id: PositionId,
      depositor: T::AccountId,
      index: u32,
    },
    /// Compounding task registered with the automation network
    AutomationRegistered {
      position_id: PositionId,
      task_id: TaskId,
      start_time: Moment,
      interval: Moment,
    },
    /// Registration rejected, retried from `retry_at`
    AutomationRegistrationFailed {
      position_id: PositionId,
      error: DispatchError,
      retry_at: BlockNumberFor<T>,
    },
    /// Compounding task cancelled
    AutomationCancelled {
      position_id: PositionId,
      task_id: TaskId,
    },
    /// Fees harvested and reinvested
    Compounded {
      position_id: PositionId,
      collected0: u128,
      collected1: u128,
      amount0: u128,
      amount1: u128,
      liquidity: u128,
    },
    /// Compound ran without reinvesting
    CompoundSkipped {
      position_id: PositionId,
      reason: SkipReason,
    },
    /// Harvested surplus swapped towards the deposit ratio
    RebalanceSwapped {
      position_id: PositionId,
      asset_in: u32,
      asset_out: u32,
      amount_in: u128,
      amount_out: u128,
    },
    /// Position returned to its depositor
    PositionWithdrawn {
      position_id: PositionId,
      recipient: T::AccountId,
      refunded0: u128,
      refunded1: u128,
    },
    /// Position pulled out of the self-compounder into custody
    ImportedFromSelfCompounder {
      position_id: PositionId,
      depositor: T::AccountId,
    },
    /// Engine account topped up for automation fees
    AutomationFunded { who: T::AccountId, amount: u128 },
    /// Compound interval updated
    CompoundIntervalUpdated { old_interval: u64, new_interval: u64 },
    /// Slippage tolerance updated
    SlippageToleranceUpdated {
      old_tolerance: Permill,
      new_tolerance: Permill,
    },
    /// Dust threshold updated
    DustThresholdUpdated {
      old_threshold: u128,
      new_threshold: u128,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Receiver hook called by something other than the position ledger
    UnknownPositionLedger,
    /// Ledger does not report the engine as owner of the position
    PositionNotOwned,
    /// Position unknown to the ledger
    PositionNotFound,
    /// Position is not held by the engine
    PositionNotInCustody,
    /// Custody set is full
    TooManyPositions,
    /// Caller is neither the depositor nor governance
    NotDepositor,
    /// Minimum interval since the last compound has not elapsed
    IntervalNotElapsed,
    /// Rebalancing swap failed
    SwapFailed,
    /// Arithmetic overflow in calculation
    ArithmeticOverflow,
    /// Amount must be non-zero
    AmountZero,
    /// An active automation task already exists for the position
    AutomationAlreadyRegistered,
    /// Positions cannot be withdrawn to the engine itself
    InvalidRecipient,
    /// Compound interval must be non-zero
    InvalidInterval,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Harvest and reinvest the fees of a custodied position
    ///
    /// Only callable by the automation network executor, no earlier than the configured interval
    /// after the previous run.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::compound())]
    pub fn compound(origin: OriginFor<T>, position_id: PositionId) -> DispatchResult {
      T::AutomationOrigin::ensure_origin(origin)?;

      let mut record = Positions::<T>::get(position_id).ok_or(Error::<T>::PositionNotInCustody)?;

      let now = Self::now();
      let interval = record
        .task
        .map(|task| task.trigger.interval)
        .unwrap_or_else(CompoundInterval::<T>::get);
      if let Some(last) = record.last_compounded_at {
        ensure!(
          now >= last.saturating_add(interval),
          Error::<T>::IntervalNotElapsed
        );
      }

      let engine = Self::account_id();
      let (collected0, collected1) =
        T::PositionLedger::collect(&engine, position_id, u128::MAX, u128::MAX)?;

      let amount0 = collected0
        .checked_add(record.leftover0)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let amount1 = collected1
        .checked_add(record.leftover1)
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      record.last_compounded_at = Some(now);

      if amount0.is_zero() && amount1.is_zero() {
        Positions::<T>::insert(position_id, record);
        log::debug!(target: LOG_TARGET, "position {position_id}: nothing to compound");
        Self::deposit_event(Event::CompoundSkipped {
          position_id,
          reason: SkipReason::NoFees,
        });
        return Ok(());
      }

      let (amount0, amount1) = Self::rebalance(position_id, &record, amount0, amount1)?;

      let (liquidity, used0, used1) =
        T::PositionLedger::increase_liquidity(&engine, position_id, amount0, amount1, 0, 0)?;

      record.leftover0 = amount0.saturating_sub(used0);
      record.leftover1 = amount1.saturating_sub(used1);
      record.compound_count = record.compound_count.saturating_add(1);
      Positions::<T>::insert(position_id, record);

      log::debug!(
        target: LOG_TARGET,
        "position {position_id}: compounded {used0}/{used1} into {liquidity} liquidity"
      );

      Self::deposit_event(Event::Compounded {
        position_id,
        collected0,
        collected1,
        amount0: used0,
        amount1: used1,
        liquidity,
      });

      Ok(())
    }

    /// Return a custodied position to its depositor's chosen recipient
    ///
    /// Cancels the automation task and refunds the leftovers carried for the position.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::withdraw())]
    pub fn withdraw(
      origin: OriginFor<T>,
      position_id: PositionId,
      recipient: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let mut record = Positions::<T>::get(position_id).ok_or(Error::<T>::PositionNotInCustody)?;
      ensure!(who == record.depositor, Error::<T>::NotDepositor);

      let engine = Self::account_id();
      ensure!(recipient != engine, Error::<T>::InvalidRecipient);

      Self::clear_automation(position_id, &mut record)?;

      CustodySet::<T>::mutate(|set| {
        if let Some(i) = set.iter().position(|id| *id == position_id) {
          set.remove(i);
        }
      });
      Positions::<T>::remove(position_id);

      let refunded0 =
        Self::refund_leftover(position_id, record.token0, &recipient, record.leftover0)?;
      let refunded1 =
        Self::refund_leftover(position_id, record.token1, &recipient, record.leftover1)?;

      T::PositionLedger::safe_transfer_from(&engine, &engine, &recipient, position_id, &[])?;

      Self::deposit_event(Event::PositionWithdrawn {
        position_id,
        recipient,
        refunded0,
        refunded1,
      });

      Ok(())
    }

    /// Register the compounding task of a custodied position now
    ///
    /// Used after a rejected registration, without waiting for the `on_idle` retry.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::register_automation())]
    pub fn register_automation(origin: OriginFor<T>, position_id: PositionId) -> DispatchResult {
      let record = Positions::<T>::get(position_id).ok_or(Error::<T>::PositionNotInCustody)?;
      Self::ensure_depositor_or_admin(origin, &record)?;
      Self::register_task(position_id).map(|_| ())
    }

    /// Cancel the compounding task of a custodied position
    ///
    /// Succeeds without effect when no task is registered.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::cancel_automation())]
    pub fn cancel_automation(origin: OriginFor<T>, position_id: PositionId) -> DispatchResult {
      let mut record = Positions::<T>::get(position_id).ok_or(Error::<T>::PositionNotInCustody)?;
      Self::ensure_depositor_or_admin(origin, &record)?;
      Self::clear_automation(position_id, &mut record)?;
      Positions::<T>::insert(position_id, record);
      Ok(())
    }

    /// Move a position from the self-compounder straight into custody
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::import_from_self_compounder())]
    pub fn import_from_self_compounder(
      origin: OriginFor<T>,
      position_id: PositionId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;

      T::SelfCompounder::withdraw_token(&who, position_id, &who)?;
      T::PositionLedger::safe_transfer_from(&who, &who, &Self::account_id(), position_id, &[])?;

      let record = Positions::<T>::get(position_id).ok_or(Error::<T>::PositionNotInCustody)?;
      ensure!(record.depositor == who, Error::<T>::NotDepositor);

      Self::deposit_event(Event::ImportedFromSelfCompounder {
        position_id,
        depositor: who,
      });

      Ok(())
    }

    /// Top up the engine account's native balance used for automation fees
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::fund_automation())]
    pub fn fund_automation(origin: OriginFor<T>, amount: u128) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(!amount.is_zero(), Error::<T>::AmountZero);

      T::Currency::transfer(
        &who,
        &Self::account_id(),
        amount,
        Preservation::Preserve,
      )?;

      Self::deposit_event(Event::AutomationFunded { who, amount });

      Ok(())
    }

    /// Update the interval used for new automation tasks (governance only)
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::update_compound_interval())]
    pub fn update_compound_interval(origin: OriginFor<T>, new_interval: u64) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(!new_interval.is_zero(), Error::<T>::InvalidInterval);
      let old_interval = CompoundInterval::<T>::get();
      CompoundInterval::<T>::put(new_interval);
      Self::deposit_event(Event::CompoundIntervalUpdated {
        old_interval,
        new_interval,
      });
      Ok(())
    }

    /// Update slippage tolerance (governance only)
    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::update_slippage_tolerance())]
    pub fn update_slippage_tolerance(
      origin: OriginFor<T>,
      new_tolerance: Permill,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let old_tolerance = SlippageTolerance::<T>::get();
      SlippageTolerance::<T>::put(new_tolerance);
      Self::deposit_event(Event::SlippageToleranceUpdated {
        old_tolerance,
        new_tolerance,
      });
      Ok(())
    }

    /// Update dust threshold (governance only)
    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::update_dust_threshold())]
    pub fn update_dust_threshold(origin: OriginFor<T>, new_threshold: u128) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let old_threshold = DustThreshold::<T>::get();
      DustThreshold::<T>::put(new_threshold);
      Self::deposit_event(Event::DustThresholdUpdated {
        old_threshold,
        new_threshold,
      });
      Ok(())
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    /// Retry due automation registrations within the weight budget
    fn on_idle(n: BlockNumberFor<T>, remaining_weight: Weight) -> Weight {
      let scan_weight = T::DbWeight::get().reads(T::MaxPositions::get().into());
      if !remaining_weight.all_gte(scan_weight) {
        return Weight::zero();
      }
      let mut consumed = scan_weight;
      let retry_weight = T::WeightInfo::retry_registration();

      let due: Vec<PositionId> = PendingRegistration::<T>::iter()
        .filter(|(_, retry_at)| *retry_at <= n)
        .map(|(position_id, _)| position_id)
        .take(T::MaxRetriesPerBlock::get() as usize)
        .collect();

      for position_id in due {
        if !remaining_weight.all_gte(consumed.saturating_add(retry_weight)) {
          break;
        }
        Self::register_or_defer(position_id);
        consumed = consumed.saturating_add(retry_weight);
      }

      consumed
    }
  }

  impl<T: Config> Pallet<T> {
    /// Get the engine account ID (derived from PalletId)
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Position id held at `index` of the custody enumeration
    pub fn custodied_position(index: u32) -> Option<PositionId> {
      CustodySet::<T>::get().get(index as usize).copied()
    }

    /// Number of positions in custody
    pub fn custody_len() -> u32 {
      CustodySet::<T>::decode_len().unwrap_or(0) as u32
    }

    fn now() -> Moment {
      T::TimeProvider::now().as_secs()
    }

    fn ensure_depositor_or_admin(
      origin: OriginFor<T>,
      record: &PositionRecordOf<T>,
    ) -> DispatchResult {
      if let Ok(who) = ensure_signed(origin.clone()) {
        ensure!(who == record.depositor, Error::<T>::NotDepositor);
        return Ok(());
      }
      T::AdminOrigin::ensure_origin(origin)?;
      Ok(())
    }

    /// Register the compounding task for `position_id`
    ///
    /// A recorded task that the network no longer reports as active is replaced.
    pub(crate) fn register_task(position_id: PositionId) -> Result<TaskId, DispatchError> {
      let mut record = Positions::<T>::get(position_id).ok_or(Error::<T>::PositionNotInCustody)?;
      if let Some(stale) = record.task {
        ensure!(
          !T::Automation::is_active(stale.task_id),
          Error::<T>::AutomationAlreadyRegistered
        );
        TaskOf::<T>::remove(stale.task_id);
      }

      let module_data = ModuleData::time(Self::now(), CompoundInterval::<T>::get());
      let call: <T as frame_system::Config>::RuntimeCall = Call::<T>::compound { position_id }.into();
      let engine = Self::account_id();

      let task_id = with_storage_layer(|| T::Automation::create_task(&engine, call, module_data))?;

      record.task = Some(AutomationTask {
        task_id,
        trigger: module_data.time,
      });
      Positions::<T>::insert(position_id, record);
      TaskOf::<T>::insert(task_id, position_id);
      PendingRegistration::<T>::remove(position_id);

      Self::deposit_event(Event::AutomationRegistered {
        position_id,
        task_id,
        start_time: module_data.time.start_time,
        interval: module_data.time.interval,
      });

      Ok(task_id)
    }

    /// Register the task, or park the position for a later retry
    pub(crate) fn register_or_defer(position_id: PositionId) {
      if let Err(error) = Self::register_task(position_id) {
        if error == Error::<T>::PositionNotInCustody.into()
          || error == Error::<T>::AutomationAlreadyRegistered.into()
        {
          PendingRegistration::<T>::remove(position_id);
          return;
        }
        let retry_at = frame_system::Pallet::<T>::block_number().saturating_add(T::RetryCooldown::get());
        PendingRegistration::<T>::insert(position_id, retry_at);
        log::warn!(
          target: LOG_TARGET,
          "position {position_id}: automation registration failed: {error:?}"
        );
        Self::deposit_event(Event::AutomationRegistrationFailed {
          position_id,
          error,
          retry_at,
        });
      }
    }

    /// Send a carried leftover to `recipient`, returning the amount sent
    ///
    /// Amounts that cannot move on their own stay in the engine account: the recipient would end
    /// below the asset minimum, or the engine would have to sweep other positions' dust with it.
    fn refund_leftover(
      position_id: PositionId,
      asset: u32,
      recipient: &T::AccountId,
      amount: u128,
    ) -> Result<u128, DispatchError> {
      if amount.is_zero() {
        return Ok(0);
      }
      let engine = Self::account_id();
      let clean_withdraw = match T::Assets::can_withdraw(asset, &engine, amount) {
        WithdrawConsequence::Success => true,
        WithdrawConsequence::ReducedToZero(dust) => dust.is_zero(),
        _ => false,
      };
      if !clean_withdraw
        || T::Assets::can_deposit(asset, recipient, amount, Provenance::Extant)
          != DepositConsequence::Success
      {
        log::debug!(
          target: LOG_TARGET,
          "position {position_id}: leftover {amount} of {asset} kept in the engine account"
        );
        return Ok(0);
      }
      T::Assets::transfer(
        asset,
        &engine,
        recipient,
        amount,
        Preservation::Expendable,
      )?;
      Ok(amount)
    }

    /// Drop the task and any pending registration of `position_id`
    fn clear_automation(
      position_id: PositionId,
      record: &mut PositionRecordOf<T>,
    ) -> DispatchResult {
      PendingRegistration::<T>::remove(position_id);
      let Some(task) = record.task.take() else {
        return Ok(());
      };
      if T::Automation::is_active(task.task_id) {
        T::Automation::cancel_task(&Self::account_id(), task.task_id)?;
      }
      TaskOf::<T>::remove(task.task_id);
      Self::deposit_event(Event::AutomationCancelled {
        position_id,
        task_id: task.task_id,
      });
      Ok(())
    }

    /// Swap the surplus side of the harvested amounts towards the deposit ratio
    ///
    /// Returns the amounts held after the swap. Rebalancing is skipped when the ledger has no
    /// ratio, the router has no quote or the surplus is dust.
    fn rebalance(
      position_id: PositionId,
      record: &PositionRecordOf<T>,
      amount0: u128,
      amount1: u128,
    ) -> Result<(u128, u128), DispatchError> {
      let Some((ratio0, ratio1)) = T::PositionLedger::deposit_ratio(position_id) else {
        return Ok((amount0, amount1));
      };
      let precision = T::Precision::get();

      let price = if ratio0.is_zero() || ratio1.is_zero() {
        0
      } else {
        match T::SwapRouter::quote(record.token0, record.token1, precision) {
          Some(price) => price,
          None => {
            log::warn!(
              target: LOG_TARGET,
              "position {position_id}: no quote for {}/{}, rebalance skipped",
              record.token0,
              record.token1
            );
            return Ok((amount0, amount1));
          }
        }
      };

      let Some(swap) =
        Self::plan_rebalance(amount0, amount1, ratio0, ratio1, price, precision)?
      else {
        return Ok((amount0, amount1));
      };

      let (asset_in, asset_out, amount_in) = match swap {
        RebalanceSwap::ZeroForOne(amount) => (record.token0, record.token1, amount),
        RebalanceSwap::OneForZero(amount) => (record.token1, record.token0, amount),
      };

      if amount_in <= DustThreshold::<T>::get() {
        log::debug!(
          target: LOG_TARGET,
          "position {position_id}: surplus {amount_in} of {asset_in} below dust threshold"
        );
        return Ok((amount0, amount1));
      }

      let Some(expected_out) = T::SwapRouter::quote(asset_in, asset_out, amount_in) else {
        log::warn!(
          target: LOG_TARGET,
          "position {position_id}: no quote for {asset_in}/{asset_out}, rebalance skipped"
        );
        return Ok((amount0, amount1));
      };
      let min_amount_out =
        expected_out.saturating_sub(SlippageTolerance::<T>::get().mul_floor(expected_out));

      let amount_out = T::SwapRouter::swap_exact_in(
        &Self::account_id(),
        asset_in,
        asset_out,
        amount_in,
        min_amount_out,
      )
      .map_err(|_| Error::<T>::SwapFailed)?;

      Self::deposit_event(Event::RebalanceSwapped {
        position_id,
        asset_in,
        asset_out,
        amount_in,
        amount_out,
      });

      Ok(match swap {
        RebalanceSwap::ZeroForOne(_) => (
          amount0.saturating_sub(amount_in),
          amount1.saturating_add(amount_out),
        ),
        RebalanceSwap::OneForZero(_) => (
          amount0.saturating_add(amount_out),
          amount1.saturating_sub(amount_in),
        ),
      })
    }

    /// Pick the swap that brings `(amount0, amount1)` to the ratio `ratio0 : ratio1`
    ///
    /// `price` is token1 received per `precision` units of token0. Holdings are valued in
    /// token1 and the token0 target is `value1 * ratio0 * precision / (ratio0 * price + ratio1 *
    /// precision)`. A zero ratio on one side means the whole of that token is sold.
    pub fn plan_rebalance(
      amount0: u128,
      amount1: u128,
      ratio0: u128,
      ratio1: u128,
      price: u128,
      precision: u128,
    ) -> Result<Option<RebalanceSwap>, DispatchError> {
      match (ratio0.is_zero(), ratio1.is_zero()) {
        (true, true) => return Ok(None),
        (true, false) => return Ok((!amount0.is_zero()).then_some(RebalanceSwap::ZeroForOne(amount0))),
        (false, true) => return Ok((!amount1.is_zero()).then_some(RebalanceSwap::OneForZero(amount1))),
        (false, false) => {}
      }
      if price.is_zero() || precision.is_zero() {
        return Ok(None);
      }

      use polkadot_sdk::sp_core::U256;

      let price_u256 = U256::from(price);
      let precision_u256 = U256::from(precision);

      let value1 = U256::from(amount0)
        .checked_mul(price_u256)
        .ok_or(Error::<T>::ArithmeticOverflow)?
        .checked_div(precision_u256)
        .ok_or(Error::<T>::ArithmeticOverflow)?
        .checked_add(U256::from(amount1))
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      let denominator = U256::from(ratio0)
        .checked_mul(price_u256)
        .ok_or(Error::<T>::ArithmeticOverflow)?
        .checked_add(
          U256::from(ratio1)
            .checked_mul(precision_u256)
            .ok_or(Error::<T>::ArithmeticOverflow)?,
        )
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      let target0 = value1
        .checked_mul(U256::from(ratio0))
        .ok_or(Error::<T>::ArithmeticOverflow)?
        .checked_mul(precision_u256)
        .ok_or(Error::<T>::ArithmeticOverflow)?
        .checked_div(denominator)
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      let held0 = U256::from(amount0);
      if held0 > target0 {
        let surplus0 = held0 - target0;
        return Ok(Some(RebalanceSwap::ZeroForOne(surplus0.as_u128())));
      }
      if target0 > held0 {
        let sell1 = (target0 - held0)
          .checked_mul(price_u256)
          .ok_or(Error::<T>::ArithmeticOverflow)?
          .checked_div(precision_u256)
          .ok_or(Error::<T>::ArithmeticOverflow)?;
        let sell1 = if sell1 > U256::from(amount1) {
          amount1
        } else {
          sell1.as_u128()
        };
        return Ok((!sell1.is_zero()).then_some(RebalanceSwap::OneForZero(sell1)));
      }
      Ok(None)
    }
  }

  impl<T: Config> PositionReceiver<T::AccountId> for Pallet<T> {
    /// Take custody of a position transferred in by the ledger
    fn on_position_received(
      caller: &T::AccountId,
      _operator: &T::AccountId,
      from: &T::AccountId,
      position_id: PositionId,
      _data: &[u8],
    ) -> Result<[u8; 4], DispatchError> {
      ensure!(
        *caller == T::PositionLedger::ledger_account(),
        Error::<T>::UnknownPositionLedger
      );
      let engine = Self::account_id();
      ensure!(
        T::PositionLedger::owner_of(position_id).as_ref() == Some(&engine),
        Error::<T>::PositionNotOwned
      );

      if Positions::<T>::contains_key(position_id) {
        return Ok(ON_POSITION_RECEIVED_SELECTOR);
      }

      let info = T::PositionLedger::position(position_id).ok_or(Error::<T>::PositionNotFound)?;

      let index = CustodySet::<T>::try_mutate(|set| -> Result<u32, DispatchError> {
        set
          .try_push(position_id)
          .map_err(|_| Error::<T>::TooManyPositions)?;
        Ok((set.len() as u32).saturating_sub(1))
      })?;

      Positions::<T>::insert(
        position_id,
        PositionRecord {
          depositor: from.clone(),
          token0: info.token0,
          token1: info.token1,
          task: None,
          deposited_at: Self::now(),
          last_compounded_at: None,
          compound_count: 0,
          leftover0: 0,
          leftover1: 0,
        },
      );

      log::debug!(target: LOG_TARGET, "position {position_id} deposited at index {index}");

      Self::deposit_event(Event::PositionDeposited {
        position_id,
        depositor: from.clone(),
        index,
      });

      Self::register_or_defer(position_id);

      Ok(ON_POSITION_RECEIVED_SELECTOR)
    }
  }

  /// Genesis configuration — ensures the engine account is ED-free
  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
