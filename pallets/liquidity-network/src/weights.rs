#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn compound() -> Weight;
  fn withdraw() -> Weight;
  fn register_automation() -> Weight;
  fn cancel_automation() -> Weight;
  fn import_from_self_compounder() -> Weight;
  fn fund_automation() -> Weight;
  fn update_compound_interval() -> Weight;
  fn update_slippage_tolerance() -> Weight;
  fn update_dust_threshold() -> Weight;
  fn retry_registration() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  fn compound() -> Weight {
    // collect + quote + swap + increase_liquidity
    Weight::from_parts(120_000_000, 4500)
      .saturating_add(T::DbWeight::get().reads(12))
      .saturating_add(T::DbWeight::get().writes(10))
  }

  fn withdraw() -> Weight {
    let max_positions = u64::from(T::MaxPositions::get());
    Weight::from_parts(
      60_000_000u64.saturating_add(max_positions.saturating_mul(20_000)),
      3000u64.saturating_add(max_positions.saturating_mul(16)),
    )
    .saturating_add(T::DbWeight::get().reads(6))
    .saturating_add(T::DbWeight::get().writes(7))
  }

  fn register_automation() -> Weight {
    Weight::from_parts(35_000_000, 2000)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  fn cancel_automation() -> Weight {
    Weight::from_parts(25_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  fn import_from_self_compounder() -> Weight {
    Weight::from_parts(90_000_000, 4000)
      .saturating_add(T::DbWeight::get().reads(10))
      .saturating_add(T::DbWeight::get().writes(9))
  }

  fn fund_automation() -> Weight {
    Weight::from_parts(20_000_000, 1800)
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn update_compound_interval() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn update_slippage_tolerance() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn update_dust_threshold() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn retry_registration() -> Weight {
    Weight::from_parts(35_000_000, 2000)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(4))
  }
}

impl WeightInfo for () {
  fn compound() -> Weight { Weight::from_parts(120_000_000, 4500) }
  fn withdraw() -> Weight { Weight::from_parts(60_000_000, 3000) }
  fn register_automation() -> Weight { Weight::from_parts(35_000_000, 2000) }
  fn cancel_automation() -> Weight { Weight::from_parts(25_000_000, 1500) }
  fn import_from_self_compounder() -> Weight { Weight::from_parts(90_000_000, 4000) }
  fn fund_automation() -> Weight { Weight::from_parts(20_000_000, 1800) }
  fn update_compound_interval() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn update_slippage_tolerance() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn update_dust_threshold() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn retry_registration() -> Weight { Weight::from_parts(35_000_000, 2000) }
}
