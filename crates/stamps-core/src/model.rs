//! Models: the schema a record conforms to.
//!
//! A [`Model`] is built once with [`ModelBuilder`] and shared behind an
//! `Arc`. Building installs the [`Timestamps`] hook on every model, resolved
//! against the properties declared so far.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  hook::{BeforeSave, Timestamps},
  record::Record,
  timestamp::{Declaration, TimestampName},
  value::ValueType,
};

// ─── Properties ──────────────────────────────────────────────────────────────

/// Options accepted by [`ModelBuilder::property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyOptions {
  /// The property may not be null once persisted.
  pub required:        bool,
  /// Whether [`Model::validate`] checks presence of a required property.
  pub auto_validation: bool,
}

impl Default for PropertyOptions {
  fn default() -> Self {
    Self {
      required:        false,
      auto_validation: true,
    }
  }
}

impl PropertyOptions {
  pub fn required() -> Self {
    Self {
      required: true,
      ..Self::default()
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
  pub name:            String,
  pub value_type:      ValueType,
  pub required:        bool,
  pub auto_validation: bool,
}

// ─── Model ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Model {
  name:       String,
  properties: Vec<Property>,
  timestamps: Arc<Timestamps>,
  /// Run in order before every save; `timestamps` is always first.
  hooks:      Vec<Arc<dyn BeforeSave>>,
}

impl Model {
  pub fn builder(name: impl Into<String>) -> ModelBuilder {
    ModelBuilder {
      name:       name.into(),
      properties: Vec::new(),
      hooks:      Vec::new(),
    }
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn properties(&self) -> &[Property] { &self.properties }

  pub fn property(&self, name: &str) -> Option<&Property> {
    self.properties.iter().find(|p| p.name == name)
  }

  pub fn has_property(&self, name: &str) -> bool {
    self.property(name).is_some()
  }

  /// The timestamp properties this model maintains, in application order.
  pub fn timestamps(&self) -> impl Iterator<Item = TimestampName> + '_ {
    self.timestamps.names()
  }

  /// Run every before-save hook against `record`.
  pub fn run_before_save(&self, record: &mut dyn Record, now: DateTime<Utc>) {
    for hook in &self.hooks {
      hook.before_save(record, now);
    }
  }

  /// Recompute timestamps even if `record` is clean. Backs `Store::touch`.
  pub fn apply_timestamps(&self, record: &mut dyn Record, now: DateTime<Utc>) {
    self.timestamps.apply(record, now);
  }

  /// Presence check for required properties that opted into validation.
  pub fn validate(&self, record: &dyn Record) -> Result<()> {
    for p in &self.properties {
      if !(p.required && p.auto_validation) {
        continue;
      }
      if record.get(&p.name).is_none_or(|v| v.is_null()) {
        return Err(Error::MissingRequired(p.name.clone()));
      }
    }
    Ok(())
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ModelBuilder {
  name:       String,
  properties: Vec<Property>,
  hooks:      Vec<Arc<dyn BeforeSave>>,
}

impl ModelBuilder {
  /// Declare a property. Re-declaring a name is an error.
  ///
  /// A property named like a timestamp must have the timestamp's type; it is
  /// then maintained by the timestamp hook even if declared here rather than
  /// through [`ModelBuilder::timestamps`].
  pub fn property(
    mut self,
    name: impl Into<String>,
    value_type: ValueType,
    options: PropertyOptions,
  ) -> Result<Self> {
    let name = name.into();
    validate_identifier(&name)?;

    if self.properties.iter().any(|p| p.name == name) {
      return Err(Error::DuplicateProperty(name));
    }
    if let Some(ts) = TimestampName::from_property(&name)
      && ts.value_type() != value_type
    {
      return Err(Error::TypeMismatch {
        property: name,
        expected: ts.value_type(),
        found:    value_type,
      });
    }

    self.properties.push(Property {
      name,
      value_type,
      required: options.required,
      auto_validation: options.auto_validation,
    });
    Ok(self)
  }

  /// Opt into one or more timestamp properties.
  ///
  /// Accepts the canonical names and the aliases `at` (`created_at` and
  /// `updated_at`) and `on` (`created_on` and `updated_on`). Fails on an
  /// empty list or an unknown name.
  pub fn timestamps<I, S>(self, names: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let declarations = names
      .into_iter()
      .map(|name| name.as_ref().parse())
      .collect::<Result<Vec<Declaration>>>()?;

    if declarations.is_empty() {
      return Err(Error::EmptyDeclaration);
    }

    declarations.into_iter().try_fold(self, Self::declare)
  }

  /// Declare a single timestamp, expanding aliases.
  pub fn declare(self, declaration: Declaration) -> Result<Self> {
    match declaration {
      Declaration::At => self
        .declare(TimestampName::CreatedAt.into())?
        .declare(TimestampName::UpdatedAt.into()),
      Declaration::On => self
        .declare(TimestampName::CreatedOn.into())?
        .declare(TimestampName::UpdatedOn.into()),
      Declaration::Canonical(name) => self.declare_timestamp(name),
    }
  }

  fn declare_timestamp(self, ts: TimestampName) -> Result<Self> {
    let options = PropertyOptions {
      required:        true,
      auto_validation: false,
    };

    let existing = self
      .properties
      .iter()
      .find(|p| p.name == ts.as_str())
      .map(|p| (p.value_type, p.required, p.auto_validation));

    match existing {
      None => self.property(ts.as_str(), ts.value_type(), options),
      Some(shape)
        if shape
          == (ts.value_type(), options.required, options.auto_validation) =>
      {
        tracing::debug!(model = %self.name, property = %ts, "timestamp already declared");
        Ok(self)
      }
      Some(_) => Err(Error::DuplicateProperty(ts.as_str().to_owned())),
    }
  }

  /// Register an additional hook, run after the timestamp hook.
  pub fn before_save(mut self, hook: impl BeforeSave + 'static) -> Self {
    self.hooks.push(Arc::new(hook));
    self
  }

  pub fn build(self) -> Result<Model> {
    validate_identifier(&self.name)?;

    let timestamps = Arc::new(Timestamps::for_properties(&self.properties));
    let mut hooks: Vec<Arc<dyn BeforeSave>> =
      Vec::with_capacity(self.hooks.len() + 1);
    hooks.push(timestamps.clone());
    hooks.extend(self.hooks);

    Ok(Model {
      name: self.name,
      properties: self.properties,
      timestamps,
      hooks,
    })
  }
}

/// Model and property names double as SQL identifiers. `id` is reserved for
/// the primary key, and SQLite's rowid aliases for insertion order.
fn validate_identifier(name: &str) -> Result<()> {
  const RESERVED: [&str; 4] = ["id", "rowid", "oid", "_rowid_"];

  let mut chars = name.chars();
  let valid_start = chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
  let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

  let reserved = RESERVED.iter().any(|r| name.eq_ignore_ascii_case(r));

  if valid_start && valid_rest && !reserved {
    Ok(())
  } else {
    Err(Error::InvalidName(name.to_owned()))
  }
}
