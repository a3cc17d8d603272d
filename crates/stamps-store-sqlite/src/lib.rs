//! SQLite backend for stamps models.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Timestamp hooks run synchronously in
//! [`SqliteStore::save`](stamps_core::store::Store::save) before the write is
//! handed to that thread.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
