//! Before-save hooks and the timestamp hook installed on every model.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{
  model::Property,
  record::Record,
  timestamp::{POLICIES, TimestampName, TimestampPolicy},
};

/// A callback run by the store immediately before a record is written.
///
/// `now` is read once per save from the store's clock. Hooks mutate the
/// record in memory only; the store decides what to persist afterwards.
pub trait BeforeSave: Send + Sync + fmt::Debug {
  fn before_save(&self, record: &mut dyn Record, now: DateTime<Utc>);
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Maintains the `created_*` / `updated_*` properties of a model.
///
/// The set of applicable policies is resolved once from the model's
/// properties when the model is built; a model without timestamp properties
/// gets an empty hook.
#[derive(Debug, Clone, Default)]
pub struct Timestamps {
  policies: Vec<&'static TimestampPolicy>,
}

/// Alternative name for [`Timestamps`].
pub type TimestampHook = Timestamps;

impl Timestamps {
  /// Select the policies whose property is declared in `properties`.
  pub fn for_properties(properties: &[Property]) -> Self {
    let policies = POLICIES
      .iter()
      .filter(|policy| {
        properties.iter().any(|p| p.name == policy.name.as_str())
      })
      .collect();
    Self { policies }
  }

  pub fn names(&self) -> impl Iterator<Item = TimestampName> + '_ {
    self.policies.iter().map(|p| p.name)
  }

  /// Recompute every applicable timestamp regardless of dirtiness.
  pub fn apply(&self, record: &mut dyn Record, now: DateTime<Utc>) {
    for policy in &self.policies {
      let Some(value) = policy.compute(record, now) else {
        continue;
      };
      if let Err(e) = record.set(policy.name.as_str(), value) {
        // The model declared this property with the policy's type, so only a
        // foreign `Record` impl can get here.
        tracing::warn!(property = %policy.name, error = %e, "skipping timestamp");
      }
    }
  }
}

impl BeforeSave for Timestamps {
  fn before_save(&self, record: &mut dyn Record, now: DateTime<Utc>) {
    // Visiting the properties of a clean record would make it dirty.
    if self.policies.is_empty() || !record.is_dirty() {
      return;
    }
    tracing::debug!(count = self.policies.len(), %now, "applying timestamps");
    self.apply(record, now);
  }
}
