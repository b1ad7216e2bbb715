//! Bookmarks Core Library
//!
//! This crate provides the core functionality for `bookmarks`, a local
//! bookmark catalog: URLs with titles, descriptions and tags stored in an
//! embedded SQLite database, with import/export to browser HTML bookmark
//! files.
//!
//! # Quick Start
//!
//! ```text
//! let mut repo = Repository::open(&Config::load()?)?;
//!
//! // Add a bookmark
//! let bookmark = repo.add(&NewBookmark::new("https://example.com").with_tags(["rust"]))?;
//!
//! // Query bookmarks tagged "rust"
//! let filter = TagFilter::new(["rust"])?;
//! let rust = repo.list(&filter, Page::default())?;
//! ```
//!
//! # Modules
//!
//! - `storage`: SQLite schema and the `Repository` (main entry point)
//! - `query`: Tag filters, keyword predicates and pagination
//! - `html`: Netscape bookmark file parsing, writing and import/export
//! - `models`: Data structures for bookmarks and tags
//! - `error`: Typed errors
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod html;
pub mod models;
pub mod query;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use html::{ImportReport, ParsedBookmark, ParsedDocument};
pub use models::{Bookmark, BookmarkUpdate, NewBookmark, TagCount};
pub use query::{KeywordFilter, Page, TagFilter};
pub use storage::Repository;
