//! The `Store` trait, the save pipeline timestamps plug into.
//!
//! The trait is implemented by storage backends (e.g. `stamps-store-sqlite`).
//! Every backend must run [`Model::run_before_save`] at the start of
//! [`Store::save`], with `now` read from [`Store::clock`].

use std::{future::Future, sync::Arc};

use uuid::Uuid;

use crate::{clock::Clock, model::Model, resource::Resource};

/// What a call to [`Store::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
  /// The resource was new and has been inserted.
  Created,
  /// The resource was persisted and dirty; its changed properties were
  /// written.
  Updated,
  /// Nothing to write.
  Unchanged,
}

/// Abstraction over a persistence backend for [`Resource`]s.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The clock consulted once per save.
  fn clock(&self) -> &dyn Clock;

  /// Ensure backing storage for `model` exists. Idempotent.
  fn register<'a>(
    &'a self,
    model: &'a Model,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Run before-save hooks, validate, then insert or update `resource`.
  ///
  /// A clean, persisted resource is left untouched and reported as
  /// [`SaveOutcome::Unchanged`].
  fn save<'a>(
    &'a self,
    resource: &'a mut Resource,
  ) -> impl Future<Output = Result<SaveOutcome, Self::Error>> + Send + 'a;

  /// Fetch a resource by id. Returns `None` if not found.
  fn get(
    &self,
    model: Arc<Model>,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Resource>, Self::Error>> + Send + '_;

  /// All resources of `model`.
  fn list(
    &self,
    model: Arc<Model>,
  ) -> impl Future<Output = Result<Vec<Resource>, Self::Error>> + Send + '_;

  /// Refresh the timestamps of `resource` even if nothing else changed, then
  /// save it. Returns whatever [`Store::save`] returns.
  fn touch<'a>(
    &'a self,
    resource: &'a mut Resource,
  ) -> impl Future<Output = Result<SaveOutcome, Self::Error>> + Send + 'a {
    async move {
      let model = Arc::clone(resource.model());
      model.apply_timestamps(&mut *resource, self.clock().now());
      self.save(resource).await
    }
  }
}
