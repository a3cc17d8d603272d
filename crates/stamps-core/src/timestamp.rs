//! The timestamp policy table.
//!
//! Four well-known property names, each paired with a value type and a rule
//! computing the value to write from the record and the moment of the save.
//! The table is a `static` and is never mutated.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};

use crate::{Error, Result, record::Record, value::Value, value::ValueType};

// ─── Names ───────────────────────────────────────────────────────────────────

/// One of the four canonical timestamp properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampName {
  UpdatedAt,
  UpdatedOn,
  CreatedAt,
  CreatedOn,
}

impl TimestampName {
  pub const ALL: [Self; 4] =
    [Self::UpdatedAt, Self::UpdatedOn, Self::CreatedAt, Self::CreatedOn];

  /// The property name on the model.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::UpdatedAt => "updated_at",
      Self::UpdatedOn => "updated_on",
      Self::CreatedAt => "created_at",
      Self::CreatedOn => "created_on",
    }
  }

  pub fn policy(self) -> &'static TimestampPolicy {
    // POLICIES is laid out in `ALL` order.
    match self {
      Self::UpdatedAt => &POLICIES[0],
      Self::UpdatedOn => &POLICIES[1],
      Self::CreatedAt => &POLICIES[2],
      Self::CreatedOn => &POLICIES[3],
    }
  }

  pub fn value_type(self) -> ValueType { self.policy().value_type }

  /// Look up a canonical property name. Accepts `created_at` and
  /// `created-at` spellings.
  pub fn from_property(name: &str) -> Option<Self> {
    match name {
      "updated_at" | "updated-at" => Some(Self::UpdatedAt),
      "updated_on" | "updated-on" => Some(Self::UpdatedOn),
      "created_at" | "created-at" => Some(Self::CreatedAt),
      "created_on" | "created-on" => Some(Self::CreatedOn),
      _ => None,
    }
  }
}

impl fmt::Display for TimestampName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Policy table ────────────────────────────────────────────────────────────

type ComputeFn = fn(&dyn Record, DateTime<Utc>) -> Option<Value>;

/// How one timestamp property is typed and filled in.
#[derive(Debug)]
pub struct TimestampPolicy {
  pub name:       TimestampName,
  pub value_type: ValueType,
  compute:        ComputeFn,
}

impl TimestampPolicy {
  /// The value to assign on save, or `None` to leave the property alone.
  pub fn compute(
    &self,
    record: &dyn Record,
    now: DateTime<Utc>,
  ) -> Option<Value> {
    (self.compute)(record, now)
  }
}

/// Every timestamp property, in the order they are applied.
pub static POLICIES: [TimestampPolicy; 4] = [
  TimestampPolicy {
    name:       TimestampName::UpdatedAt,
    value_type: ValueType::DateTime,
    compute:    |_, now| Some(Value::DateTime(now)),
  },
  TimestampPolicy {
    name:       TimestampName::UpdatedOn,
    value_type: ValueType::Date,
    compute:    |_, now| Some(Value::Date(now.date_naive())),
  },
  TimestampPolicy {
    name:       TimestampName::CreatedAt,
    value_type: ValueType::DateTime,
    compute:    |record, now| {
      created(record, TimestampName::CreatedAt, Value::DateTime(now))
    },
  },
  TimestampPolicy {
    name:       TimestampName::CreatedOn,
    value_type: ValueType::Date,
    compute:    |record, now| {
      created(record, TimestampName::CreatedOn, Value::Date(now.date_naive()))
    },
  },
];

/// Write-once rule shared by the `created_*` properties: keep an existing
/// value, fill in `fresh` on a new record, otherwise leave it alone.
fn created(
  record: &dyn Record,
  name: TimestampName,
  fresh: Value,
) -> Option<Value> {
  match record.get(name.as_str()) {
    Some(existing) if !existing.is_null() => Some(existing.clone()),
    _ if record.is_new() => Some(fresh),
    _ => None,
  }
}

// ─── Declarations ────────────────────────────────────────────────────────────

/// A name accepted by `ModelBuilder::timestamps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
  Canonical(TimestampName),
  /// `created_at` and `updated_at`.
  At,
  /// `created_on` and `updated_on`.
  On,
}

impl FromStr for Declaration {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "at" => Ok(Self::At),
      "on" => Ok(Self::On),
      other => TimestampName::from_property(other)
        .map(Self::Canonical)
        .ok_or_else(|| Error::InvalidTimestampName(other.to_owned())),
    }
  }
}

impl From<TimestampName> for Declaration {
  fn from(name: TimestampName) -> Self { Self::Canonical(name) }
}
