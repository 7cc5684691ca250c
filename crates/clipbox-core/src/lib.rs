//! Clipbox Core Library
//!
//! This crate provides the core functionality for Clipbox, a local
//! save-a-link tool: links are filed into a fixed set of categories, can be
//! pinned, and are stored in a local SQLite database.
//!
//! # Quick Start
//!
//! ```text
//! let store = LinkStore::open()?;
//!
//! // Save a link; the title is fetched from the page when not given
//! let link = store.add_link("https://example.com", "read", None).await?;
//!
//! // Browse a category, pinned links first
//! let reading = store.get_links_by_category("read");
//! ```
//!
//! # Modules
//!
//! - `store`: The link store (main entry point)
//! - `models`: Saved links, partial updates and the category list
//! - `title`: Title resolution through fetch strategies with a local fallback
//! - `capture`: Share-target and bookmarklet helpers
//! - `storage`: SQLite schema, row access and errors
//! - `config`: Application configuration

pub mod capture;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;
pub mod title;

pub use capture::{CaptureRequest, SharePayload};
pub use config::Config;
pub use models::{Category, LinkPatch, SavedLink, CATEGORIES, DEFAULT_CATEGORY};
pub use storage::{StoreError, StoreResult};
pub use store::LinkStore;
pub use title::{FetchError, HtmlFetcher, TitleResolver};
