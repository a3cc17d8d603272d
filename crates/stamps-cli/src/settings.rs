//! Settings file shape and model construction.

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use stamps_core::{Model, PropertyOptions, ValueType};

/// Top-level settings, read from TOML and `STAMPS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub models:     Vec<ModelConfig>,
}

fn default_store_path() -> PathBuf { PathBuf::from("stamps.db") }

/// One `[[models]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
  pub name:       String,
  #[serde(default)]
  pub properties: Vec<PropertyConfig>,
  /// Declaration names: canonical timestamp names, `at` or `on`.
  #[serde(default)]
  pub timestamps: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyConfig {
  pub name:     String,
  #[serde(rename = "type")]
  pub kind:     ValueType,
  #[serde(default)]
  pub required: bool,
}

impl Settings {
  pub fn load(path: PathBuf) -> Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("STAMPS"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  /// Build every configured model, keyed by name.
  pub fn build_models(&self) -> Result<BTreeMap<String, Arc<Model>>> {
    let mut models = BTreeMap::new();
    for cfg in &self.models {
      let model = cfg
        .build()
        .with_context(|| format!("invalid model {:?}", cfg.name))?;
      if models.insert(cfg.name.clone(), Arc::new(model)).is_some() {
        bail!("model {:?} is defined twice", cfg.name);
      }
    }
    Ok(models)
  }
}

impl ModelConfig {
  pub fn build(&self) -> Result<Model> {
    let mut builder = Model::builder(&self.name);
    for p in &self.properties {
      let options = PropertyOptions {
        required: p.required,
        ..PropertyOptions::default()
      };
      builder = builder.property(&p.name, p.kind, options)?;
    }
    // An empty list means "no timestamps", not an empty declaration.
    if !self.timestamps.is_empty() {
      builder = builder.timestamps(&self.timestamps)?;
    }
    Ok(builder.build()?)
  }
}
