//! The record repository façade.

use crate::cache::QueryCache;
use crate::config::RepositoryConfig;
use crate::error::RepositoryResult;
use crate::hash::query_hash;
use recstore_mapper::{Mapper, MapperFactory, MapperParams, Record, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Returns whether `value` marks its key for removal on merge.
///
/// An explicit null deletes, and so does the case-insensitive string
/// `"null"` (configuration surfaces that cannot express a real null pass it
/// spelled out).
fn is_delete_marker(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.eq_ignore_ascii_case("null"),
        _ => false,
    }
}

/// The façade callers use to read and write one logical record per query.
///
/// A repository is created per logical repository kind (for example
/// "preferences") and lazily constructs exactly one backend mapper through
/// the factory on first use. Loaded snapshots are held per query hash, so
/// distinct queries never share an entry; an external [`QueryCache`] can be
/// attached to avoid re-reading backend storage on every access.
///
/// A snapshot entry is `Some(record)` once loaded and `None` when the
/// record was explicitly cleared; a failed save keeps the in-memory
/// snapshot so the caller may retry persisting.
///
/// # Example
///
/// ```no_run
/// use recstore_core::{Repository, RepositoryConfig};
/// use recstore_mapper::{record_from, MapperParams};
/// use serde_json::json;
///
/// let mut repository = Repository::new(
///     RepositoryConfig::new(),
///     MapperParams::new().with_query("prefs/alice"),
/// )?;
/// repository.set_data(Some(record_from([("theme", json!("dark"))])), true);
/// let data = repository.get_data();
/// # Ok::<(), recstore_core::RepositoryError>(())
/// ```
pub struct Repository {
    config: RepositoryConfig,
    factory: MapperFactory,
    params: MapperParams,
    mapper: Option<Box<dyn Mapper>>,
    snapshots: HashMap<String, Option<Record>>,
    cache: Option<Arc<dyn QueryCache>>,
}

impl Repository {
    /// Creates a repository for one logical record kind.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured backend type name does not
    /// resolve - a deployment misconfiguration surfaced at startup.
    pub fn new(config: RepositoryConfig, params: MapperParams) -> RepositoryResult<Self> {
        let factory = MapperFactory::new(config.mapper_config()?);
        Ok(Self {
            config,
            factory,
            params,
            mapper: None,
            snapshots: HashMap::new(),
            cache: None,
        })
    }

    /// Attaches an external query cache.
    ///
    /// Only consulted when the configuration enables `cache_query`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn QueryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the directory connector used by LDAP mappers (tests).
    #[must_use]
    pub fn with_connector(
        mut self,
        connector: Arc<dyn recstore_mapper::DirectoryConnector>,
    ) -> Self {
        self.factory = self.factory.with_connector(connector);
        self
    }

    /// Returns the repository configuration.
    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Returns the backend mapper, constructing and initializing it on
    /// first use.
    ///
    /// Rename goes through the mapper directly; cache entries are
    /// refreshed only by loads and saves.
    pub fn mapper(&mut self) -> &mut dyn Mapper {
        let Self {
            mapper,
            factory,
            params,
            ..
        } = self;
        mapper
            .get_or_insert_with(|| factory.create_initialized(None, params))
            .as_mut()
    }

    /// Re-binds the underlying mapper to another query.
    ///
    /// Snapshots already loaded for other queries are untouched.
    pub fn select(&mut self, query: &str) {
        self.mapper().select(query);
    }

    /// Returns the cache key for the currently selected query.
    fn current_hash(&mut self) -> Option<String> {
        let salt = self.config.cache_salt.clone();
        let query = self.mapper().current_query()?.to_owned();
        Some(query_hash(&salt, &query))
    }

    /// Returns the record for the current query.
    ///
    /// Loads it on first access: from the external cache when query caching
    /// is enabled, otherwise through the mapper, mirroring the loaded
    /// snapshot back into the cache. `None` when no query is selected or
    /// the effective data is absent.
    pub fn get_data(&mut self) -> Option<Record> {
        let hash = self.current_hash()?;
        if !self.snapshots.contains_key(&hash) {
            let loaded = self.load_data(&hash);
            self.snapshots.insert(hash.clone(), loaded);
        }
        self.snapshots.get(&hash).cloned().flatten()
    }

    /// Merges `data` into the record for the current query.
    ///
    /// When a loaded snapshot and non-null input both exist, keys merge
    /// one by one: a null value - or the case-insensitive string `"null"` -
    /// removes the key, anything else overwrites it. Otherwise `data`
    /// becomes the record verbatim.
    ///
    /// With `persist` set, the merged record is pushed through the mapper
    /// and the cache entry refreshed; the return value is the outcome of
    /// the mapper's write. Without it, the merge stays in memory and the
    /// call returns `true`.
    pub fn set_data(&mut self, data: Option<Record>, persist: bool) -> bool {
        let Some(hash) = self.current_hash() else {
            return false;
        };
        let previous = self.snapshots.get(&hash).cloned().flatten();
        let merged = match (previous, data) {
            (Some(mut current), Some(updates)) => {
                for (key, value) in updates {
                    if is_delete_marker(&value) {
                        current.remove(&key);
                    } else {
                        current.insert(key, value);
                    }
                }
                Some(current)
            }
            (_, updates) => updates,
        };
        self.snapshots.insert(hash.clone(), merged);
        if !persist {
            return true;
        }
        self.save_data(&hash)
    }

    /// Removes the record for the current query.
    ///
    /// Drops the snapshot and expires the cache entry once the mapper
    /// reports the physical target gone.
    pub fn delete(&mut self) -> bool {
        let Some(hash) = self.current_hash() else {
            return false;
        };
        let removed = self.mapper().delete();
        if removed {
            self.snapshots.remove(&hash);
            if self.config.cache_query {
                if let Some(cache) = &self.cache {
                    cache.set(&hash, None, -1);
                }
            }
        }
        removed
    }

    fn load_data(&mut self, hash: &str) -> Option<Record> {
        if self.config.cache_query {
            if let Some(cache) = &self.cache {
                if let Some(data) = cache.get(hash) {
                    debug!(%hash, "query cache hit");
                    return Some(data);
                }
            }
        }
        let data = self.mapper().record();
        if self.config.cache_query {
            if let Some(cache) = &self.cache {
                cache.set(hash, Some(data.clone()), self.config.cache_maxage);
            }
        }
        Some(data)
    }

    fn save_data(&mut self, hash: &str) -> bool {
        let snapshot = self.snapshots.get(hash).cloned().flatten();
        let record = snapshot.clone().unwrap_or_default();
        let mapper = self.mapper();
        mapper.set_record(record);
        let persisted = mapper.modify();
        if persisted && self.config.cache_query {
            if let Some(cache) = &self.cache {
                // Deleted-to-empty records must not linger in the cache
                let max_age = if snapshot.is_some() {
                    self.config.cache_maxage
                } else {
                    -1
                };
                cache.set(hash, snapshot, max_age);
            }
        }
        persisted
    }
}
