//! # recstore core
//!
//! Record repository, query hashing and caching for recstore.
//!
//! This crate provides the façade callers use over the backend mappers:
//! - [`Repository`] - per-kind record access with partial-update merging
//! - [`query_hash`] - salted SHA-1 query identity, the cache key
//! - [`QueryCache`] / [`MemoryCache`] - the consumed cache contract and an
//!   in-memory implementation
//! - [`RepositoryConfig`] - process-wide options
//!
//! ## Example
//!
//! ```no_run
//! use recstore_core::{Repository, RepositoryConfig};
//! use recstore_mapper::{record_from, MapperParams};
//! use serde_json::json;
//!
//! let mut preferences = Repository::new(
//!     RepositoryConfig::new(),
//!     MapperParams::new().with_query("repository/preference"),
//! )?;
//! preferences.set_data(Some(record_from([("theme", json!("dark"))])), true);
//! # Ok::<(), recstore_core::RepositoryError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod hash;
mod repository;

pub use cache::{MemoryCache, QueryCache};
pub use config::RepositoryConfig;
pub use error::{RepositoryError, RepositoryResult};
pub use hash::query_hash;
pub use repository::Repository;
