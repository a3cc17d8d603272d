//! Error type for `stamps-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stamps_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be decoded as its property's type.
  #[error("decode error: {0}")]
  Decode(String),

  /// Attempted to update a resource whose row does not exist.
  #[error("resource not found: {0}")]
  NotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
