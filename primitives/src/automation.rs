//! Automation network task primitives.
//!
//! A task is created with a list of trigger modules and one argument blob per module.
//! Only the time module is used here: the task becomes executable at `start_time` and
//! then at most once every `interval` seconds.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Identifier of an automation task as returned by the network
pub type TaskId = [u8; 32];

/// Wall-clock moment in seconds
pub type Moment = u64;

/// Trigger modules the liquidity network registers tasks with.
///
/// The discriminants are the module ids used on the wire.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum TriggerModule {
  /// Time-based execution with a minimum interval
  Time = 1,
}

impl TriggerModule {
  pub fn id(&self) -> u8 {
    *self as u8
  }
}

/// Arguments of the time module: `(start_time, interval)`
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct TimeTrigger {
  pub start_time: Moment,
  pub interval: Moment,
}

impl TimeTrigger {
  pub fn new(start_time: Moment, interval: Moment) -> Self {
    Self {
      start_time,
      interval,
    }
  }

  /// Earliest moment the task may run again after an execution at `last_exec`
  pub fn next_exec_after(&self, last_exec: Option<Moment>) -> Moment {
    match last_exec {
      Some(last) => last.saturating_add(self.interval).max(self.start_time),
      None => self.start_time,
    }
  }

  pub fn is_due(&self, now: Moment, last_exec: Option<Moment>) -> bool {
    now >= self.next_exec_after(last_exec)
  }
}

/// Module selection and per-module arguments attached to a task
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct ModuleData {
  pub module: TriggerModule,
  pub time: TimeTrigger,
}

impl ModuleData {
  pub fn time(start_time: Moment, interval: Moment) -> Self {
    Self {
      module: TriggerModule::Time,
      time: TimeTrigger::new(start_time, interval),
    }
  }
}
