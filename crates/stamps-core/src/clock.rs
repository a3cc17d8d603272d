//! Wall-clock source for save operations.
//!
//! A store reads its clock once per save and hands the instant to every
//! before-save hook, so all timestamps written by one save agree.

use std::{
  fmt,
  sync::{Mutex, PoisonError},
};

use chrono::{DateTime, TimeDelta, Utc};

pub trait Clock: Send + Sync + fmt::Debug {
  fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to. Useful for tests and replays.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self {
      now: Mutex::new(start),
    }
  }

  pub fn set(&self, to: DateTime<Utc>) {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
  }

  /// Move the clock forward by `by` and return the new instant.
  pub fn advance(&self, by: TimeDelta) -> DateTime<Utc> {
    let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
    *now += by;
    *now
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
