//! Repository configuration.

use crate::error::RepositoryResult;
use recstore_mapper::{DirectoryServerConfig, MapperConfig};

/// Process-wide repository options.
///
/// Read-only once built; loading these values from a configuration file is
/// the owning application's concern. Backend kinds are carried as the type
/// names a configuration file holds and resolved when the repository is
/// built, so a misspelled name fails at startup rather than at first
/// access.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Whether loaded snapshots are mirrored into the query cache.
    pub cache_query: bool,
    /// Cache entry lifetime in seconds, when query caching is enabled.
    pub cache_maxage: i64,
    /// Salt mixed into every query hash.
    pub cache_salt: String,
    /// Default backend type name (case-sensitive).
    pub mapper_default: String,
    /// Legacy backend type name; set it to migrate records from an old
    /// backend format on first access.
    pub mapper_from: Option<String>,
    /// Directory servers for the LDAP backend, in declaration order.
    pub servers: Vec<DirectoryServerConfig>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            cache_query: false,
            cache_maxage: 600,
            cache_salt: String::new(),
            mapper_default: "json".to_owned(),
            mapper_from: None,
            servers: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables query caching.
    #[must_use]
    pub fn with_cache_query(mut self, enabled: bool) -> Self {
        self.cache_query = enabled;
        self
    }

    /// Sets the cache entry lifetime in seconds.
    #[must_use]
    pub fn with_cache_maxage(mut self, seconds: i64) -> Self {
        self.cache_maxage = seconds;
        self
    }

    /// Sets the query hash salt.
    #[must_use]
    pub fn with_cache_salt(mut self, salt: impl Into<String>) -> Self {
        self.cache_salt = salt.into();
        self
    }

    /// Sets the default backend type name.
    #[must_use]
    pub fn with_mapper_default(mut self, name: impl Into<String>) -> Self {
        self.mapper_default = name.into();
        self
    }

    /// Sets the legacy backend type name to migrate records from.
    #[must_use]
    pub fn with_mapper_from(mut self, name: impl Into<String>) -> Self {
        self.mapper_from = Some(name.into());
        self
    }

    /// Appends a directory server.
    #[must_use]
    pub fn with_server(mut self, server: DirectoryServerConfig) -> Self {
        self.servers.push(server);
        self
    }

    /// Resolves the mapper-layer configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when a backend type name does not resolve.
    pub fn mapper_config(&self) -> RepositoryResult<MapperConfig> {
        let mut config = MapperConfig::new().with_default_kind(self.mapper_default.parse()?);
        if let Some(name) = &self.mapper_from {
            config = config.with_legacy_kind(name.parse()?);
        }
        config.servers = self.servers.clone();
        Ok(config)
    }
}
