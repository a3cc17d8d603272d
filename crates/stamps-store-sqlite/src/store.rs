//! [`SqliteStore`], the SQLite implementation of [`Store`].

use std::{path::Path, sync::Arc};

use rusqlite::{OptionalExtension as _, types::Value as SqlValue};
use uuid::Uuid;

use stamps_core::{
  Model, Record as _, Resource,
  clock::{Clock, SystemClock},
  store::{SaveOutcome, Store},
};

use crate::{
  Error, Result,
  encode::{RawRow, encode_uuid, encode_value},
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A stamps store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection and clock are reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Arc<dyn Clock>,
}

impl SqliteStore {
  /// Open (or create) a store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self {
      conn,
      clock: Arc::new(SystemClock),
    };
    store.init_connection().await?;
    Ok(store)
  }

  /// Open an in-memory store. Useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self {
      conn,
      clock: Arc::new(SystemClock),
    };
    store.init_connection().await?;
    Ok(store)
  }

  /// Replace the clock consulted on save.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  async fn init_connection(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert every property of a new resource.
  async fn insert(&self, resource: &Resource) -> Result<()> {
    let table = resource.model().name().to_owned();
    let (columns, mut params): (Vec<&str>, Vec<SqlValue>) = resource
      .values()
      .map(|(name, value)| (name, encode_value(value)))
      .unzip();
    let sql = schema::insert(&table, &columns);
    params.insert(0, SqlValue::Text(encode_uuid(resource.id())));

    tracing::debug!(%table, id = %resource.id(), "insert");
    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write the dirty properties of a persisted resource.
  async fn update(&self, resource: &Resource) -> Result<()> {
    let table = resource.model().name().to_owned();
    let (columns, mut params): (Vec<&str>, Vec<SqlValue>) = resource
      .dirty_values()
      .map(|(name, value)| (name, encode_value(value)))
      .unzip();
    let sql = schema::update(&table, &columns);
    params.push(SqlValue::Text(encode_uuid(resource.id())));

    tracing::debug!(%table, id = %resource.id(), ?columns, "update");
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params))?))
      .await?;

    if changed == 0 {
      return Err(Error::NotFound(resource.id()));
    }
    Ok(())
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;

  fn clock(&self) -> &dyn Clock { self.clock.as_ref() }

  async fn register<'a>(&'a self, model: &'a Model) -> Result<()> {
    let ddl = schema::create_table(model);
    tracing::info!(model = model.name(), "registering table");

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn save<'a>(&'a self, resource: &'a mut Resource) -> Result<SaveOutcome> {
    let now = self.clock.now();
    let model = Arc::clone(resource.model());
    model.run_before_save(&mut *resource, now);

    let outcome = if resource.is_new() {
      model.validate(&*resource)?;
      self.insert(resource).await?;
      SaveOutcome::Created
    } else if resource.is_dirty() {
      model.validate(&*resource)?;
      self.update(resource).await?;
      SaveOutcome::Updated
    } else {
      return Ok(SaveOutcome::Unchanged);
    };

    resource.mark_persisted();
    Ok(outcome)
  }

  async fn get(&self, model: Arc<Model>, id: Uuid) -> Result<Option<Resource>> {
    let sql = format!("{} WHERE id = ?1", schema::select_all(&model));
    let width = model.properties().len();
    let id_str = encode_uuid(id);

    let raw: Option<RawRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawRow::from_row(row, width)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_resource(model)).transpose()
  }

  async fn list(&self, model: Arc<Model>) -> Result<Vec<Resource>> {
    let sql = format!("{} ORDER BY rowid", schema::select_all(&model));
    let width = model.properties().len();

    let raws: Vec<RawRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| RawRow::from_row(row, width))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|r| r.into_resource(Arc::clone(&model)))
      .collect()
  }
}
