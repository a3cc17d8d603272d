//! Automatic `created_*` / `updated_*` timestamps for persisted records.
//!
//! A model opts in with [`ModelBuilder::timestamps`]; every built model gets
//! a before-save hook that fills the declared properties from the static
//! policy table in [`timestamp`]. Stores implement [`store::Store`] and call
//! the hooks from their save pipeline.
//!
//! ```rust,ignore
//! let posts = Model::builder("posts")
//!   .property("title", ValueType::Text, PropertyOptions::required())?
//!   .timestamps(["at"])?
//!   .build()?;
//! ```
//!
//! This crate is free of database dependencies.

pub mod clock;
pub mod error;
pub mod hook;
pub mod model;
pub mod record;
pub mod resource;
pub mod store;
pub mod timestamp;
pub mod value;

pub use error::{Error, Result};
pub use model::{Model, ModelBuilder, Property, PropertyOptions};
pub use record::Record;
pub use resource::Resource;
pub use value::{Value, ValueType};
