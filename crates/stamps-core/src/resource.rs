//! [`Resource`], the generic record type stores read and write.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use uuid::Uuid;

use crate::{Error, Result, model::Model, record::Record, value::Value};

/// A single record of some [`Model`], with change tracking.
///
/// The id is assigned on construction, so a resource can be referenced
/// before its first save.
#[derive(Debug, Clone)]
pub struct Resource {
  id:         Uuid,
  model:      Arc<Model>,
  attributes: BTreeMap<String, Value>,
  /// Properties assigned since the last successful save.
  dirty:      BTreeSet<String>,
  persisted:  bool,
}

impl Resource {
  /// A new, never-persisted resource.
  pub fn new(model: Arc<Model>) -> Self {
    Self {
      id: Uuid::new_v4(),
      model,
      attributes: BTreeMap::new(),
      dirty: BTreeSet::new(),
      persisted: false,
    }
  }

  /// A clean resource rebuilt from storage. Attributes must already be typed
  /// per the model; the caller (a store) is trusted here.
  pub fn load(
    model: Arc<Model>,
    id: Uuid,
    attributes: BTreeMap<String, Value>,
  ) -> Self {
    Self {
      id,
      model,
      attributes,
      dirty: BTreeSet::new(),
      persisted: true,
    }
  }

  pub fn id(&self) -> Uuid { self.id }

  pub fn model(&self) -> &Arc<Model> { &self.model }

  /// Builder-style [`Record::set`].
  pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
    self.set(name, value.into())?;
    Ok(self)
  }

  /// The value of `name`, treating unassigned properties as `Null`.
  pub fn value(&self, name: &str) -> &Value {
    static NULL: Value = Value::Null;
    self.attributes.get(name).unwrap_or(&NULL)
  }

  /// Every property of the model with its current value, in declaration
  /// order.
  pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
    self
      .model
      .properties()
      .iter()
      .map(|p| (p.name.as_str(), self.value(&p.name)))
  }

  /// Properties changed since the last save, in declaration order.
  pub fn dirty_values(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
    self.values().filter(|(name, _)| self.dirty.contains(*name))
  }

  /// Record a successful write.
  pub fn mark_persisted(&mut self) {
    self.dirty.clear();
    self.persisted = true;
  }

  /// Render as a JSON object with an `id` key plus one key per property.
  pub fn to_json(&self) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert("id".into(), self.id.to_string().into());
    for (name, value) in self.values() {
      map.insert(
        name.to_owned(),
        serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
      );
    }
    serde_json::Value::Object(map)
  }
}

impl Record for Resource {
  fn is_dirty(&self) -> bool { !self.persisted || !self.dirty.is_empty() }

  fn is_new(&self) -> bool { !self.persisted }

  fn has_property(&self, name: &str) -> bool { self.model.has_property(name) }

  fn get(&self, name: &str) -> Option<&Value> { self.attributes.get(name) }

  fn set(&mut self, name: &str, value: Value) -> Result<()> {
    let property =
      self
        .model
        .property(name)
        .ok_or_else(|| Error::UnknownProperty {
          model:    self.model.name().to_owned(),
          property: name.to_owned(),
        })?;

    if let Some(found) = value.value_type()
      && !value.fits(property.value_type)
    {
      return Err(Error::TypeMismatch {
        property: name.to_owned(),
        expected: property.value_type,
        found,
      });
    }

    // `NaN` never compares equal, so assigning it always dirties the record.
    if *self.value(name) == value {
      return Ok(());
    }
    self.attributes.insert(name.to_owned(), value);
    self.dirty.insert(name.to_owned());
    Ok(())
  }
}
