//! Error types for `stamps-core`.

use thiserror::Error;

use crate::value::ValueType;

#[derive(Debug, Error)]
pub enum Error {
  /// `ModelBuilder::timestamps` was called without any names.
  #[error("at least one timestamp name is required")]
  EmptyDeclaration,

  #[error("invalid timestamp property name: {0:?}")]
  InvalidTimestampName(String),

  #[error("invalid identifier: {0:?}")]
  InvalidName(String),

  #[error("property {0:?} is already declared")]
  DuplicateProperty(String),

  #[error("model {model:?} has no property {property:?}")]
  UnknownProperty { model: String, property: String },

  #[error("property {property:?} expects {expected}, got {found}")]
  TypeMismatch {
    property: String,
    expected: ValueType,
    found:    ValueType,
  },

  #[error("unknown value type: {0:?}")]
  UnknownValueType(String),

  #[error("cannot parse {input:?} as {expected}")]
  InvalidValue { input: String, expected: ValueType },

  #[error("required property {0:?} is missing")]
  MissingRequired(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
