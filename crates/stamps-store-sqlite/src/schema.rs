//! SQL generated from a [`Model`].
//!
//! One table per model, named after it. `id` holds the resource UUID; every
//! property becomes a column, `NOT NULL` when required. Model and property
//! names are validated identifiers, and are quoted anyway.

use stamps_core::{Model, ValueType};

pub fn column_type(ty: ValueType) -> &'static str {
  match ty {
    ValueType::Boolean | ValueType::Integer => "INTEGER",
    ValueType::Float => "REAL",
    // RFC 3339 and ISO dates sort lexically.
    ValueType::Text | ValueType::DateTime | ValueType::Date => "TEXT",
  }
}

pub fn quote(ident: &str) -> String { format!("\"{ident}\"") }

/// `CREATE TABLE IF NOT EXISTS` DDL for `model`.
pub fn create_table(model: &Model) -> String {
  let mut columns = vec!["id TEXT PRIMARY KEY".to_owned()];
  columns.extend(model.properties().iter().map(|p| {
    let null = if p.required { " NOT NULL" } else { "" };
    format!("{} {}{null}", quote(&p.name), column_type(p.value_type))
  }));

  format!(
    "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
    quote(model.name()),
    columns.join(",\n    ")
  )
}

/// `SELECT id, <properties...> FROM <table>` without a WHERE clause.
pub fn select_all(model: &Model) -> String {
  let mut columns = vec!["id".to_owned()];
  columns.extend(model.properties().iter().map(|p| quote(&p.name)));
  format!("SELECT {} FROM {}", columns.join(", "), quote(model.name()))
}

/// `INSERT` with `id` as `?1` followed by one placeholder per column.
pub fn insert(table: &str, columns: &[&str]) -> String {
  let names: Vec<String> = std::iter::once("id".to_owned())
    .chain(columns.iter().map(|c| quote(c)))
    .collect();
  let placeholders: Vec<String> =
    (1..=names.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    quote(table),
    names.join(", "),
    placeholders.join(", ")
  )
}

/// `UPDATE` of `columns` (`?1..?n`) for the row whose id is `?{n+1}`.
pub fn update(table: &str, columns: &[&str]) -> String {
  let assignments: Vec<String> = columns
    .iter()
    .enumerate()
    .map(|(i, c)| format!("{} = ?{}", quote(c), i + 1))
    .collect();
  format!(
    "UPDATE {} SET {} WHERE id = ?{}",
    quote(table),
    assignments.join(", "),
    columns.len() + 1
  )
}
