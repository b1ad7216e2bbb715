//! Storage layer
//!
//! SQLite is the only store. `schema` creates the tables; `repository`
//! translates bookmark operations into SQL and owns transaction
//! boundaries.
//!
//! ## Tables
//!
//! - `bookmarks` - Bookmark records
//! - `tags` - Normalized, unique tag names
//! - `bookmark_tags` - Bookmark-to-tag junction (cascades on bookmark delete)

pub mod repository;
pub mod schema;

pub use repository::Repository;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
