//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use stamps_core::{
  Model, PropertyOptions, Record, Resource, Value, ValueType,
  clock::ManualClock,
  hook::BeforeSave,
  store::{SaveOutcome, Store},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

fn start() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 10, 22, 15, 0).unwrap() }

async fn store() -> (SqliteStore, Arc<ManualClock>) {
  let clock = Arc::new(ManualClock::new(start()));
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
    .with_clock(clock.clone());
  (store, clock)
}

async fn registered(store: &SqliteStore, model: Model) -> Arc<Model> {
  store.register(&model).await.unwrap();
  Arc::new(model)
}

fn posts(timestamps: &[&str]) -> Model {
  let mut builder = Model::builder("posts")
    .property("title", ValueType::Text, PropertyOptions::required())
    .unwrap()
    .property("views", ValueType::Integer, PropertyOptions::default())
    .unwrap();
  if !timestamps.is_empty() {
    builder = builder.timestamps(timestamps).unwrap();
  }
  builder.build().unwrap()
}

// ─── Save pipeline ───────────────────────────────────────────────────────────

#[tokio::test]
async fn first_save_sets_created_and_updated() {
  let (s, _) = store().await;
  let model = registered(&s, posts(&["at"])).await;

  let mut post = Resource::new(model.clone()).with("title", "hello").unwrap();
  assert_eq!(s.save(&mut post).await.unwrap(), SaveOutcome::Created);
  assert!(!post.is_new());
  assert!(!post.is_dirty());

  assert_eq!(post.value("created_at"), &Value::DateTime(start()));
  assert_eq!(post.value("updated_at"), &Value::DateTime(start()));

  let fetched = s.get(model, post.id()).await.unwrap().unwrap();
  assert_eq!(fetched.value("created_at"), &Value::DateTime(start()));
  assert_eq!(fetched.value("updated_at"), &Value::DateTime(start()));
  assert_eq!(fetched.value("title"), &Value::from("hello"));
}

#[tokio::test]
async fn later_save_keeps_created_and_advances_updated() {
  let (s, clock) = store().await;
  let model = registered(&s, posts(&["at", "on"])).await;

  let mut post = Resource::new(model.clone()).with("title", "draft").unwrap();
  s.save(&mut post).await.unwrap();

  let later = clock.advance(TimeDelta::days(1));
  post.set("title", "final".into()).unwrap();
  assert_eq!(s.save(&mut post).await.unwrap(), SaveOutcome::Updated);

  let fetched = s.get(model, post.id()).await.unwrap().unwrap();
  assert_eq!(fetched.value("title"), &Value::from("final"));
  assert_eq!(fetched.value("created_at"), &Value::DateTime(start()));
  assert_eq!(fetched.value("created_on"), &Value::Date(start().date_naive()));
  assert_eq!(fetched.value("updated_at"), &Value::DateTime(later));
  assert_eq!(fetched.value("updated_on"), &Value::Date(later.date_naive()));
}

#[tokio::test]
async fn created_at_survives_reload_and_update() {
  let (s, clock) = store().await;
  let model = registered(&s, posts(&["created_at", "updated_at"])).await;

  let mut post = Resource::new(model.clone()).with("title", "one").unwrap();
  s.save(&mut post).await.unwrap();

  clock.advance(TimeDelta::hours(2));
  let mut reloaded = s.get(model.clone(), post.id()).await.unwrap().unwrap();
  reloaded.set("views", Value::Integer(10)).unwrap();
  s.save(&mut reloaded).await.unwrap();

  let fetched = s.get(model, post.id()).await.unwrap().unwrap();
  assert_eq!(fetched.value("created_at"), &Value::DateTime(start()));
  assert_eq!(
    fetched.value("updated_at"),
    &Value::DateTime(start() + TimeDelta::hours(2))
  );
  assert_eq!(fetched.value("views"), &Value::Integer(10));
}

#[tokio::test]
async fn clean_save_does_not_touch_timestamps() {
  let (s, clock) = store().await;
  let model = registered(&s, posts(&["at"])).await;

  let mut post = Resource::new(model.clone()).with("title", "still").unwrap();
  s.save(&mut post).await.unwrap();

  clock.advance(TimeDelta::minutes(30));
  let mut reloaded = s.get(model.clone(), post.id()).await.unwrap().unwrap();
  assert_eq!(s.save(&mut reloaded).await.unwrap(), SaveOutcome::Unchanged);
  assert_eq!(reloaded.value("updated_at"), &Value::DateTime(start()));

  let fetched = s.get(model, post.id()).await.unwrap().unwrap();
  assert_eq!(fetched.value("updated_at"), &Value::DateTime(start()));
}

#[tokio::test]
async fn model_without_timestamps_saves_normally() {
  let (s, _) = store().await;
  let model = registered(&s, posts(&[])).await;

  let mut post = Resource::new(model.clone())
    .with("title", "plain")
    .unwrap()
    .with("views", 1_i64)
    .unwrap();
  assert_eq!(s.save(&mut post).await.unwrap(), SaveOutcome::Created);

  let fetched = s.get(model, post.id()).await.unwrap().unwrap();
  assert_eq!(fetched.value("views"), &Value::Integer(1));
  assert_eq!(fetched.values().count(), 2);
}

#[tokio::test]
async fn new_record_without_other_attributes_still_gets_timestamps() {
  let (s, _) = store().await;
  let model = Model::builder("events")
    .timestamps(["on"])
    .unwrap()
    .build()
    .unwrap();
  let model = registered(&s, model).await;

  let mut event = Resource::new(model.clone());
  assert_eq!(s.save(&mut event).await.unwrap(), SaveOutcome::Created);

  let fetched = s.get(model, event.id()).await.unwrap().unwrap();
  assert_eq!(fetched.value("created_on"), &Value::Date(start().date_naive()));
  assert_eq!(fetched.value("updated_on"), &Value::Date(start().date_naive()));
}

// ─── Custom hooks ────────────────────────────────────────────────────────────

/// Records what it saw of `updated_at` under its label.
#[derive(Debug, Clone)]
struct Recorder {
  label: &'static str,
  seen:  Arc<Mutex<Vec<(&'static str, Option<Value>)>>>,
}

impl BeforeSave for Recorder {
  fn before_save(&self, record: &mut dyn Record, _now: DateTime<Utc>) {
    let updated = record.get("updated_at").cloned();
    self.seen.lock().unwrap().push((self.label, updated));
  }
}

#[tokio::test]
async fn custom_hooks_run_after_timestamps_in_registration_order() {
  let (s, clock) = store().await;
  let seen = Arc::new(Mutex::new(Vec::new()));
  let recorder = |label| Recorder {
    label,
    seen: seen.clone(),
  };

  let model = Model::builder("posts")
    .property("title", ValueType::Text, PropertyOptions::required())
    .unwrap()
    .before_save(recorder("first"))
    .timestamps(["at"])
    .unwrap()
    .before_save(recorder("second"))
    .build()
    .unwrap();
  let model = registered(&s, model).await;

  let mut post = Resource::new(model).with("title", "hooked").unwrap();
  s.save(&mut post).await.unwrap();

  let at = Some(Value::DateTime(start()));
  assert_eq!(
    *seen.lock().unwrap(),
    [("first", at.clone()), ("second", at)]
  );

  // Custom hooks run on every save, clean or not.
  clock.advance(TimeDelta::hours(1));
  assert_eq!(s.save(&mut post).await.unwrap(), SaveOutcome::Unchanged);
  assert_eq!(seen.lock().unwrap().len(), 4);
}

// ─── Touch ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn touch_updates_a_clean_record() {
  let (s, clock) = store().await;
  let model = registered(&s, posts(&["at", "on"])).await;

  let mut post = Resource::new(model.clone()).with("title", "idle").unwrap();
  s.save(&mut post).await.unwrap();

  let later = clock.advance(TimeDelta::days(3));
  let mut reloaded = s.get(model.clone(), post.id()).await.unwrap().unwrap();
  assert!(!reloaded.is_dirty());
  assert_eq!(s.touch(&mut reloaded).await.unwrap(), SaveOutcome::Updated);
  assert!(!reloaded.is_dirty());

  let fetched = s.get(model, post.id()).await.unwrap().unwrap();
  assert_eq!(fetched.value("created_at"), &Value::DateTime(start()));
  assert_eq!(fetched.value("updated_at"), &Value::DateTime(later));
  assert_eq!(fetched.value("updated_on"), &Value::Date(later.date_naive()));
  assert_eq!(fetched.value("title"), &Value::from("idle"));
}

#[tokio::test]
async fn touch_does_nothing_until_awaited() {
  let (s, clock) = store().await;
  let model = registered(&s, posts(&["at"])).await;

  let mut post = Resource::new(model).with("title", "idle").unwrap();
  s.save(&mut post).await.unwrap();

  clock.advance(TimeDelta::days(1));
  drop(s.touch(&mut post));
  assert!(!post.is_dirty());
  assert_eq!(post.value("updated_at"), &Value::DateTime(start()));
}

#[tokio::test]
async fn touch_inserts_a_new_record() {
  let (s, _) = store().await;
  let model = registered(&s, posts(&["at"])).await;

  let mut post = Resource::new(model.clone()).with("title", "fresh").unwrap();
  assert_eq!(s.touch(&mut post).await.unwrap(), SaveOutcome::Created);
  assert_eq!(post.value("created_at"), &Value::DateTime(start()));
}

#[tokio::test]
async fn touch_propagates_save_errors() {
  let (s, _) = store().await;
  let model = registered(&s, posts(&["at"])).await;

  // Missing the required title.
  let mut post = Resource::new(model);
  let err = s.touch(&mut post).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(stamps_core::Error::MissingRequired(name)) if name == "title"
  ));
  assert!(post.is_new());
}

// ─── Errors and reads ────────────────────────────────────────────────────────

#[tokio::test]
async fn update_of_deleted_row_is_not_found() {
  let (s, _) = store().await;
  let model = registered(&s, posts(&["at"])).await;

  let mut ghost = Resource::load(model, Uuid::new_v4(), Default::default());
  ghost.set("title", "boo".into()).unwrap();
  let err = s.save(&mut ghost).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(id) if id == ghost.id()));
}

#[tokio::test]
async fn saving_an_unregistered_model_fails() {
  let (s, _) = store().await;
  let model = Arc::new(posts(&["at"]));

  let mut post = Resource::new(model).with("title", "lost").unwrap();
  let err = s.save(&mut post).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn register_is_idempotent() {
  let (s, _) = store().await;
  let model = posts(&["at"]);
  s.register(&model).await.unwrap();
  s.register(&model).await.unwrap();
}

#[test]
fn rowid_aliases_cannot_shadow_insertion_order() {
  for name in ["rowid", "OID", "_rowid_"] {
    let err = Model::builder("posts")
      .property(name, ValueType::Text, PropertyOptions::default())
      .unwrap_err();
    assert!(matches!(err, stamps_core::Error::InvalidName(n) if n == name));
  }
}

#[tokio::test]
async fn get_missing_returns_none() {
  let (s, _) = store().await;
  let model = registered(&s, posts(&[])).await;
  assert!(s.get(model, Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_returns_insertion_order() {
  let (s, clock) = store().await;
  let model = registered(&s, posts(&["at"])).await;

  for title in ["zzz", "aaa", "mmm"] {
    let mut post = Resource::new(model.clone()).with("title", title).unwrap();
    s.save(&mut post).await.unwrap();
    clock.advance(TimeDelta::seconds(1));
  }

  let all = s.list(model).await.unwrap();
  let titles: Vec<_> = all.iter().map(|p| p.value("title").clone()).collect();
  assert_eq!(titles, ["zzz", "aaa", "mmm"].map(Value::from));
  assert!(all.iter().all(|p| !p.is_dirty()));
  assert_eq!(
    all[2].value("created_at"),
    &Value::DateTime(start() + TimeDelta::seconds(2))
  );
}
