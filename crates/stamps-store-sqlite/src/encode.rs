//! Encoding and decoding helpers between [`Value`]s and SQLite column values.
//!
//! Datetimes are stored as RFC 3339 strings, dates as `YYYY-MM-DD`, booleans
//! as `0`/`1`. UUIDs are stored as hyphenated lowercase strings.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use stamps_core::{Model, Resource, Value, ValueType};
use uuid::Uuid;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Value ────────────────────────────────────────────────────────────────────

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
    Value::Integer(n) => SqlValue::Integer(*n),
    Value::Float(f) => SqlValue::Real(*f),
    Value::Text(s) => SqlValue::Text(s.clone()),
    // Fixed precision keeps stored values comparable as text.
    Value::DateTime(dt) => {
      SqlValue::Text(dt.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }
    Value::Date(d) => SqlValue::Text(d.format(DATE_FORMAT).to_string()),
  }
}

pub fn decode_value(raw: SqlValue, ty: ValueType) -> Result<Value> {
  let mismatch = |raw: &SqlValue| {
    Error::Decode(format!("expected {ty}, found {:?}", raw.data_type()))
  };

  match (ty, raw) {
    (_, SqlValue::Null) => Ok(Value::Null),
    (ValueType::Boolean, SqlValue::Integer(n)) => Ok(Value::Boolean(n != 0)),
    (ValueType::Integer, SqlValue::Integer(n)) => Ok(Value::Integer(n)),
    (ValueType::Float, SqlValue::Real(f)) => Ok(Value::Float(f)),
    // SQLite may hand back integral REALs as INTEGER.
    (ValueType::Float, SqlValue::Integer(n)) => Ok(Value::Float(n as f64)),
    (ValueType::Text, SqlValue::Text(s)) => Ok(Value::Text(s)),
    (ValueType::DateTime, SqlValue::Text(s)) => decode_dt(&s).map(Value::DateTime),
    (ValueType::Date, SqlValue::Text(s)) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
      .map(Value::Date)
      .map_err(|e| Error::Decode(e.to_string())),
    (_, raw) => Err(mismatch(&raw)),
  }
}

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read directly from a model table, in
/// `schema::select_all` order.
pub struct RawRow {
  pub id:      String,
  pub columns: Vec<SqlValue>,
}

impl RawRow {
  pub fn from_row(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Self> {
    let id = row.get(0)?;
    let columns = (1..=width)
      .map(|i| row.get::<_, SqlValue>(i))
      .collect::<rusqlite::Result<_>>()?;
    Ok(Self { id, columns })
  }

  pub fn into_resource(self, model: Arc<Model>) -> Result<Resource> {
    let id = decode_uuid(&self.id)?;

    let mut attributes = BTreeMap::new();
    for (property, raw) in model.properties().iter().zip(self.columns) {
      let value = decode_value(raw, property.value_type)?;
      if !value.is_null() {
        attributes.insert(property.name.clone(), value);
      }
    }

    Ok(Resource::load(model, id, attributes))
  }
}
