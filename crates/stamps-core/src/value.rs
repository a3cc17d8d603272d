//! Typed attribute values.
//!
//! Every property on a model has a [`ValueType`]; a record holds one [`Value`]
//! per property. `Null` is a valid value for any type and stands for "unset".

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── ValueType ───────────────────────────────────────────────────────────────

/// The declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
  Boolean,
  Integer,
  Float,
  Text,
  /// A UTC instant.
  DateTime,
  /// A calendar date without time component.
  Date,
}

impl ValueType {
  /// Name used in configuration files and error messages.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Boolean => "boolean",
      Self::Integer => "integer",
      Self::Float => "float",
      Self::Text => "text",
      Self::DateTime => "datetime",
      Self::Date => "date",
    }
  }
}

impl fmt::Display for ValueType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ValueType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "boolean" | "bool" => Ok(Self::Boolean),
      "integer" | "int" => Ok(Self::Integer),
      "float" => Ok(Self::Float),
      "text" | "string" => Ok(Self::Text),
      "datetime" => Ok(Self::DateTime),
      "date" => Ok(Self::Date),
      other => Err(Error::UnknownValueType(other.to_owned())),
    }
  }
}

// ─── Value ───────────────────────────────────────────────────────────────────

/// A single attribute value.
///
/// Serialises untagged, so records render as plain JSON objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
  #[default]
  Null,
  Boolean(bool),
  Integer(i64),
  Float(f64),
  Text(String),
  DateTime(DateTime<Utc>),
  Date(NaiveDate),
}

impl Value {
  /// The type of this value, or `None` for `Null`.
  pub fn value_type(&self) -> Option<ValueType> {
    match self {
      Self::Null => None,
      Self::Boolean(_) => Some(ValueType::Boolean),
      Self::Integer(_) => Some(ValueType::Integer),
      Self::Float(_) => Some(ValueType::Float),
      Self::Text(_) => Some(ValueType::Text),
      Self::DateTime(_) => Some(ValueType::DateTime),
      Self::Date(_) => Some(ValueType::Date),
    }
  }

  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// Whether this value may be stored in a property of type `ty`.
  pub fn fits(&self, ty: ValueType) -> bool {
    self.value_type().is_none_or(|own| own == ty)
  }

  /// Parse user input (e.g. a CLI argument) as a value of type `ty`.
  ///
  /// Datetimes are RFC 3339; dates are `YYYY-MM-DD`. `NaN` is not a valid
  /// float.
  pub fn parse(input: &str, ty: ValueType) -> Result<Self> {
    let invalid = || Error::InvalidValue {
      input:    input.to_owned(),
      expected: ty,
    };

    match ty {
      ValueType::Boolean => match input {
        "true" | "1" => Ok(Self::Boolean(true)),
        "false" | "0" => Ok(Self::Boolean(false)),
        _ => Err(invalid()),
      },
      ValueType::Integer => {
        input.parse().map(Self::Integer).map_err(|_| invalid())
      }
      ValueType::Float => match input.parse::<f64>() {
        Ok(n) if !n.is_nan() => Ok(Self::Float(n)),
        _ => Err(invalid()),
      },
      ValueType::Text => Ok(Self::Text(input.to_owned())),
      ValueType::DateTime => DateTime::parse_from_rfc3339(input)
        .map(|dt| Self::DateTime(dt.with_timezone(&Utc)))
        .map_err(|_| invalid()),
      ValueType::Date => NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Self::Date)
        .map_err(|_| invalid()),
    }
  }

}

impl From<DateTime<Utc>> for Value {
  fn from(dt: DateTime<Utc>) -> Self { Self::DateTime(dt) }
}

impl From<NaiveDate> for Value {
  fn from(d: NaiveDate) -> Self { Self::Date(d) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self { Self::Integer(n) }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Self::Boolean(b) }
}
