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
  fn support_rex() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
  fn support_rex() -> Weight {
    // approval + legacy transfer/burn + protocol mint
    Weight::from_parts(75_000_000, 6200)
      .saturating_add(T::DbWeight::get().reads(8))
      .saturating_add(T::DbWeight::get().writes(8))
  }
}

impl WeightInfo for () {
  fn support_rex() -> Weight {
    Weight::from_parts(75_000_000, 6200)
      .saturating_add(RocksDbWeight::get().reads(8))
      .saturating_add(RocksDbWeight::get().writes(8))
  }
}
