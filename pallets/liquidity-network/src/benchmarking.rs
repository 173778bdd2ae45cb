use crate::*;
use frame::deps::frame_benchmarking::{account, v2::*};
use frame::deps::frame_support::traits::EnsureOrigin;
use frame::deps::frame_system::{self, RawOrigin};
use frame::deps::sp_runtime::{Permill, traits::Zero};
use primitives::PositionId;

const FEES: u128 = 1_000_000_000_000;

fn deposited_position<T: Config>(owner: &T::AccountId) -> PositionId {
  let position_id =
    T::BenchmarkHelper::create_position(owner, FEES, FEES).expect("Failed to create position");
  T::PositionLedger::safe_transfer_from(owner, owner, &Pallet::<T>::account_id(), position_id, &[])
    .expect("Failed to deposit position");
  position_id
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn compound() -> Result<(), BenchmarkError> {
    let depositor: T::AccountId = whitelisted_caller();
    let position_id = deposited_position::<T>(&depositor);
    let origin =
      T::AutomationOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

    #[extrinsic_call]
    compound(origin as T::RuntimeOrigin, position_id);

    assert!(
      Positions::<T>::get(position_id)
        .and_then(|record| record.last_compounded_at)
        .is_some()
    );
    Ok(())
  }

  #[benchmark]
  fn withdraw() {
    let depositor: T::AccountId = whitelisted_caller();
    let recipient: T::AccountId = account("recipient", 0, 0);
    let position_id = deposited_position::<T>(&depositor);

    #[extrinsic_call]
    withdraw(RawOrigin::Signed(depositor), position_id, recipient.clone());

    assert_eq!(
      T::PositionLedger::owner_of(position_id),
      Some(recipient)
    );
  }

  #[benchmark]
  fn register_automation() {
    let depositor: T::AccountId = whitelisted_caller();
    let position_id = deposited_position::<T>(&depositor);
    Pallet::<T>::cancel_automation(RawOrigin::Signed(depositor.clone()).into(), position_id)
      .expect("Failed to cancel task");

    #[extrinsic_call]
    register_automation(RawOrigin::Signed(depositor), position_id);

    assert!(
      Positions::<T>::get(position_id)
        .and_then(|record| record.task)
        .is_some()
    );
  }

  #[benchmark]
  fn cancel_automation() {
    let depositor: T::AccountId = whitelisted_caller();
    let position_id = deposited_position::<T>(&depositor);

    #[extrinsic_call]
    cancel_automation(RawOrigin::Signed(depositor), position_id);

    assert!(
      Positions::<T>::get(position_id)
        .and_then(|record| record.task)
        .is_none()
    );
  }

  #[benchmark]
  fn import_from_self_compounder() {
    let depositor: T::AccountId = whitelisted_caller();
    let position_id =
      T::BenchmarkHelper::create_position(&depositor, FEES, FEES).expect("Failed to create position");
    T::BenchmarkHelper::stake_in_self_compounder(&depositor, position_id)
      .expect("Failed to stake position");

    #[extrinsic_call]
    import_from_self_compounder(RawOrigin::Signed(depositor), position_id);

    assert!(Positions::<T>::contains_key(position_id));
  }

  #[benchmark]
  fn fund_automation() {
    let caller: T::AccountId = whitelisted_caller();
    let amount: u128 = FEES;
    T::BenchmarkHelper::fund_native(&caller, amount.saturating_mul(2))
      .expect("Failed to fund caller");

    #[extrinsic_call]
    fund_automation(RawOrigin::Signed(caller), amount);
  }

  #[benchmark]
  fn update_compound_interval() {
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");

    #[extrinsic_call]
    update_compound_interval(origin as T::RuntimeOrigin, 120);

    assert_eq!(CompoundInterval::<T>::get(), 120);
  }

  #[benchmark]
  fn update_slippage_tolerance() {
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");

    #[extrinsic_call]
    update_slippage_tolerance(origin as T::RuntimeOrigin, Permill::from_percent(5));
  }

  #[benchmark]
  fn update_dust_threshold() {
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");

    #[extrinsic_call]
    update_dust_threshold(origin as T::RuntimeOrigin, 10_000);
  }

  #[benchmark]
  fn retry_registration() {
    let depositor: T::AccountId = whitelisted_caller();
    let position_id = deposited_position::<T>(&depositor);
    Pallet::<T>::cancel_automation(RawOrigin::Signed(depositor).into(), position_id)
      .expect("Failed to cancel task");
    PendingRegistration::<T>::insert(
      position_id,
      frame_system::pallet_prelude::BlockNumberFor::<T>::zero(),
    );

    #[block]
    {
      Pallet::<T>::register_or_defer(position_id);
    }

    assert!(!PendingRegistration::<T>::contains_key(position_id));
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
