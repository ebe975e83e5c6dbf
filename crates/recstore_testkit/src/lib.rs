//! # recstore testkit
//!
//! Test utilities for recstore.
//!
//! This crate provides:
//! - Temp-directory fixtures for the file backends
//! - A canned directory connector for LDAP tests
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use recstore_testkit::prelude::*;
//!
//! let store = TempStore::new();
//! let query = store.query("prefs/alice");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
