//! Protocol Token Pallet
//!
//! One-way migrator from the legacy protocol token into REX.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub(crate) const LOG_TARGET: &str = "runtime::protocol-token";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  /// Give `who` `amount` legacy tokens plus enough native balance to place an approval
  fn prepare_holder(who: &AccountId, amount: u128) -> frame::deps::sp_runtime::DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, WeightInfo};
  use frame::deps::{
    frame_support::traits::{
      fungibles::{
        Inspect as FungiblesInspect, Mutate as FungiblesMutate,
        approvals::{Inspect as ApprovalsInspect, Mutate as ApprovalsMutate},
      },
      tokens::{Fortitude, Precision, Preservation, WithdrawConsequence},
    },
    sp_runtime::traits::{AccountIdConversion, Zero},
  };
  use frame::prelude::*;

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Fungible assets holding both the legacy and the protocol token
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = u128>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = u128>
      + ApprovalsInspect<Self::AccountId, AssetId = u32, Balance = u128>
      + ApprovalsMutate<Self::AccountId, AssetId = u32, Balance = u128>;

    /// Asset burned on migration
    #[pallet::constant]
    type LegacyAsset: Get<u32>;

    /// Asset minted on migration
    #[pallet::constant]
    type ProtocolAsset: Get<u32>;

    /// Upper bound on the protocol tokens minted through migration
    #[pallet::constant]
    type MaxSupply: Get<u128>;

    /// The pallet ID, the migrator account is derived from it
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  /// The pallet module, the place to define dispatchable calls, storage items, events, errors, etc.
  ///
  /// Holders approve the migrator account for their legacy tokens and call `support_rex`. The
  /// migrator spends the approval, burns the amount from the holder and mints the same amount of
  /// the protocol token to them. Migration never runs in reverse.
  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// Protocol tokens minted through migration, equal to legacy tokens burned
  #[pallet::storage]
  #[pallet::getter(fn total_migrated)]
  pub type TotalMigrated<T: Config> = StorageValue<_, u128, ValueQuery>;

  /// Amount migrated by each holder
  #[pallet::storage]
  #[pallet::getter(fn migrated_by)]
  pub type MigratedBy<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, u128, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Legacy tokens burned and protocol tokens minted 1:1
    Migrated {
      who: T::AccountId,
      amount: u128,
      total_migrated: u128,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Amount must be greater than zero
    AmountZero,
    /// The migrator is not approved for this much legacy token
    InsufficientAllowance,
    /// Caller holds less legacy token than requested
    InsufficientLegacyBalance,
    /// The legacy balance left behind would be below the asset minimum
    WouldLeaveDust,
    /// Migration would mint past the maximum supply
    SupplyCapExceeded,
    /// Arithmetic overflow
    ArithmeticOverflow,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Burn `amount` approved legacy tokens and mint the same amount of the protocol token
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::support_rex())]
    pub fn support_rex(origin: OriginFor<T>, amount: u128) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(!amount.is_zero(), Error::<T>::AmountZero);

      let legacy = T::LegacyAsset::get();
      let migrator = Self::account_id();

      ensure!(
        T::Assets::allowance(legacy, &who, &migrator) >= amount,
        Error::<T>::InsufficientAllowance
      );
      ensure!(
        T::Assets::balance(legacy, &who) >= amount,
        Error::<T>::InsufficientLegacyBalance
      );
      ensure!(
        match T::Assets::can_withdraw(legacy, &who, amount) {
          WithdrawConsequence::Success => true,
          WithdrawConsequence::ReducedToZero(dust) => dust.is_zero(),
          _ => false,
        },
        Error::<T>::WouldLeaveDust
      );
      let total_migrated = TotalMigrated::<T>::get()
        .checked_add(amount)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      ensure!(
        total_migrated <= T::MaxSupply::get(),
        Error::<T>::SupplyCapExceeded
      );

      // Spend the approval without moving funds, the burn happens on the holder's account
      T::Assets::transfer_from(legacy, &who, &migrator, &who, amount)?;
      T::Assets::burn_from(
        legacy,
        &who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
      T::Assets::mint_into(T::ProtocolAsset::get(), &who, amount)?;

      TotalMigrated::<T>::put(total_migrated);
      MigratedBy::<T>::mutate(&who, |migrated| *migrated = migrated.saturating_add(amount));

      log::debug!(
        target: LOG_TARGET,
        "migrated {amount} legacy tokens for {who:?}, total {total_migrated}"
      );

      Self::deposit_event(Event::Migrated {
        who,
        amount,
        total_migrated,
      });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Get the migrator account ID (derived from PalletId)
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn protocol_balance(who: &T::AccountId) -> u128 {
      T::Assets::balance(T::ProtocolAsset::get(), who)
    }

    pub fn protocol_supply() -> u128 {
      T::Assets::total_issuance(T::ProtocolAsset::get())
    }
  }

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
