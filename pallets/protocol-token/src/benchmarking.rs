use crate::*;
use frame::deps::frame_benchmarking::v2::*;
use frame::deps::frame_support::traits::{Get, fungibles::approvals::Mutate as ApprovalsMutate};
use frame::deps::frame_system::RawOrigin;

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn support_rex() {
    let caller: T::AccountId = whitelisted_caller();
    let amount: u128 = 1_000_000_000_000;
    T::BenchmarkHelper::prepare_holder(&caller, amount.saturating_mul(2))
      .expect("Failed to prepare holder");
    T::Assets::approve(
      T::LegacyAsset::get(),
      &caller,
      &Pallet::<T>::account_id(),
      amount,
    )
    .expect("Failed to approve migrator");

    #[extrinsic_call]
    support_rex(RawOrigin::Signed(caller.clone()), amount);

    assert_eq!(Pallet::<T>::migrated_by(&caller), amount);
    assert_eq!(Pallet::<T>::total_migrated(), amount);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
