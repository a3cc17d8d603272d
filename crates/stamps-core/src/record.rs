//! The `Record` trait: what a before-save hook may see and touch.

use crate::{Result, value::Value};

/// A persistable record as seen by lifecycle hooks.
///
/// Object safe, so hooks take `&mut dyn Record` and work with any record
/// representation a store chooses.
pub trait Record {
  /// Whether the record has changes that are not yet persisted.
  fn is_dirty(&self) -> bool;

  /// Whether the record has never been successfully persisted.
  fn is_new(&self) -> bool;

  /// Whether the record's model declares a property called `name`.
  fn has_property(&self, name: &str) -> bool;

  /// The current value of `name`, or `None` if it was never assigned.
  fn get(&self, name: &str) -> Option<&Value>;

  /// Assign `value` to `name`. Assigning a different value marks the record
  /// dirty.
  fn set(&mut self, name: &str, value: Value) -> Result<()>;
}
