//! Test fixtures and helpers.

use recstore_mapper::{
    record_from, Directory, DirectoryConnector, DirectoryServerConfig, MapperResult, Record,
};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

/// A temporary directory for file-backed records.
///
/// Queries built through [`TempStore::query`] live under the directory and
/// disappear with it.
pub struct TempStore {
    dir: TempDir,
}

impl TempStore {
    /// Creates a fresh temporary store.
    ///
    /// # Panics
    ///
    /// Panics when the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Returns the store's root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Builds a query string addressing `name` inside the store.
    #[must_use]
    pub fn query(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a small record with mixed value shapes.
#[must_use]
pub fn sample_record() -> Record {
    record_from([
        ("lang", json!("en")),
        ("theme", json!("dark")),
        ("tags", json!(["a", "b"])),
        ("visits", json!(7)),
    ])
}

/// A directory connector serving canned rows per server name.
///
/// Stands in for real LDAP servers the way an in-memory backend stands in
/// for files: deterministic, ordered, offline.
pub struct CannedConnector {
    rows: HashMap<String, Vec<Record>>,
}

impl CannedConnector {
    /// Creates a connector with no rows on any server.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// Sets the rows served by `server`.
    #[must_use]
    pub fn with_rows(mut self, server: impl Into<String>, rows: Vec<Record>) -> Self {
        self.rows.insert(server.into(), rows);
        self
    }
}

impl Default for CannedConnector {
    fn default() -> Self {
        Self::new()
    }
}

struct CannedDirectory {
    rows: Vec<Record>,
}

impl Directory for CannedDirectory {
    fn search(
        &mut self,
        _base: &str,
        _filter: &str,
        _attributes: Option<&[String]>,
    ) -> MapperResult<Vec<Record>> {
        Ok(self.rows.clone())
    }
}

impl DirectoryConnector for CannedConnector {
    fn connect(&self, server: &DirectoryServerConfig) -> MapperResult<Box<dyn Directory>> {
        Ok(Box::new(CannedDirectory {
            rows: self.rows.get(&server.name).cloned().unwrap_or_default(),
        }))
    }
}

/// Builds a pair of directory server configurations for multi-server tests.
#[must_use]
pub fn two_directory_servers() -> Vec<DirectoryServerConfig> {
    vec![
        DirectoryServerConfig::new("primary", "ldap://primary.example.com")
            .with_base_dn("ou=people,dc=example,dc=com"),
        DirectoryServerConfig::new("secondary", "ldap://secondary.example.com")
            .with_base_dn("ou=people,dc=example,dc=com"),
    ]
}
