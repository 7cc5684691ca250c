//! Storage layer
//!
//! A single SQLite table of saved links plus a `schema_info` table holding
//! the schema version.
//!
//! ## Tables
//!
//! - `links` - Link records, indexed by category, creation time and pin flag
//! - `schema_info` - Key/value metadata (`version`)

pub mod error;
pub mod links;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use schema::{ensure_schema, needs_init, SchemaState, SCHEMA_VERSION};
