//! `stamps`: create, update and touch timestamped records from the shell.
//!
//! Models are declared in `stamps.toml` (or the path given with `--config`):
//!
//! ```toml
//! store_path = "blog.db"
//!
//! [[models]]
//! name = "posts"
//! timestamps = ["at"]
//!
//! [[models.properties]]
//! name = "title"
//! type = "text"
//! required = true
//! ```
//!
//! ```
//! stamps create posts title=Hello
//! stamps touch posts 3f0c...
//! ```

mod settings;

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use stamps_core::{Model, Record as _, Resource, Value, store::Store};
use stamps_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::settings::Settings;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "stamps", version, about = "Timestamped records in SQLite")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "stamps.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create a record from `key=value` pairs.
  Create {
    model:  String,
    #[arg(value_parser = parse_assignment)]
    values: Vec<(String, String)>,
  },
  /// Change properties of an existing record.
  Update {
    model:  String,
    id:     Uuid,
    #[arg(value_parser = parse_assignment, required = true)]
    values: Vec<(String, String)>,
  },
  /// Refresh a record's timestamps and save it.
  Touch { model: String, id: Uuid },
  /// Print one record as JSON.
  Show { model: String, id: Uuid },
  /// Print every record of a model as JSON.
  List { model: String },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
  s.split_once('=')
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(cli.config)?;
  let models = settings.build_models()?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  for model in models.values() {
    store.register(model).await?;
  }

  let lookup = |name: &str| -> Result<Arc<Model>> {
    models
      .get(name)
      .cloned()
      .ok_or_else(|| anyhow!("unknown model {name:?}"))
  };

  match cli.command {
    Command::Create { model, values } => {
      let mut resource = Resource::new(lookup(&model)?);
      assign(&mut resource, &values)?;
      store.save(&mut resource).await?;
      print_json(&resource.to_json())?;
    }
    Command::Update { model, id, values } => {
      let mut resource = fetch(&store, lookup(&model)?, id).await?;
      assign(&mut resource, &values)?;
      let outcome = store.save(&mut resource).await?;
      tracing::info!(?outcome, %id, "saved");
      print_json(&resource.to_json())?;
    }
    Command::Touch { model, id } => {
      let mut resource = fetch(&store, lookup(&model)?, id).await?;
      let outcome = store.touch(&mut resource).await?;
      tracing::info!(?outcome, %id, "touched");
      print_json(&resource.to_json())?;
    }
    Command::Show { model, id } => {
      let resource = fetch(&store, lookup(&model)?, id).await?;
      print_json(&resource.to_json())?;
    }
    Command::List { model } => {
      let resources = store.list(lookup(&model)?).await?;
      let rows = resources.iter().map(Resource::to_json).collect();
      print_json(&serde_json::Value::Array(rows))?;
    }
  }

  Ok(())
}

async fn fetch(store: &SqliteStore, model: Arc<Model>, id: Uuid) -> Result<Resource> {
  let name = model.name().to_owned();
  store
    .get(model, id)
    .await?
    .ok_or_else(|| anyhow!("no {name} record with id {id}"))
}

/// Parse each `key=value` against the property's type and assign it. An
/// empty value assigns null.
fn assign(resource: &mut Resource, values: &[(String, String)]) -> Result<()> {
  let mut parsed = BTreeMap::new();
  for (key, raw) in values {
    let model = resource.model();
    let property = model
      .property(key)
      .ok_or_else(|| anyhow!("{} has no property {key:?}", model.name()))?;
    let value = if raw.is_empty() {
      Value::Null
    } else {
      Value::parse(raw, property.value_type)?
    };
    if parsed.insert(key.as_str(), value).is_some() {
      bail!("property {key:?} is assigned more than once");
    }
  }

  for (key, value) in parsed {
    resource.set(key, value)?;
  }
  Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
