//! Mapper registry and factory.

use crate::error::MapperResult;
use crate::json::JsonMapper;
use crate::kind::MapperKind;
use crate::ldap::{DirectoryConnector, DirectoryServerConfig, LdapConnector, LdapMapper};
use crate::mapper::Mapper;
use crate::migrate;
use crate::params::MapperParams;
use crate::xml::XmlMapper;
use std::sync::Arc;

/// Process-wide mapper options.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Backend constructed when no explicit kind is requested.
    pub default_kind: MapperKind,
    /// Backend records are migrated away from, when configured.
    ///
    /// Absent in the common case; setting it enables the one-time
    /// copy-then-delete conversion on initialization.
    pub legacy_kind: Option<MapperKind>,
    /// Directory servers consulted by the LDAP backend, in declaration
    /// order.
    pub servers: Vec<DirectoryServerConfig>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            default_kind: MapperKind::Json,
            legacy_kind: None,
            servers: Vec::new(),
        }
    }
}

impl MapperConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default backend kind.
    #[must_use]
    pub fn with_default_kind(mut self, kind: MapperKind) -> Self {
        self.default_kind = kind;
        self
    }

    /// Sets the legacy backend kind to migrate records from.
    #[must_use]
    pub fn with_legacy_kind(mut self, kind: MapperKind) -> Self {
        self.legacy_kind = Some(kind);
        self
    }

    /// Appends a directory server.
    #[must_use]
    pub fn with_server(mut self, server: DirectoryServerConfig) -> Self {
        self.servers.push(server);
        self
    }
}

/// Constructs mappers for backend kinds and mediates their initialization.
///
/// Holds the process-wide [`MapperConfig`]; initialization through the
/// factory runs the legacy-backend conversion whenever the initialized
/// mapper resolves a query, so a pending migration is retried on every
/// initialization until it succeeds.
pub struct MapperFactory {
    config: MapperConfig,
    connector: Arc<dyn DirectoryConnector>,
}

impl MapperFactory {
    /// Creates a factory over `config` with the real LDAP connector.
    #[must_use]
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            connector: Arc::new(LdapConnector),
        }
    }

    /// Replaces the directory connector (used by tests).
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn DirectoryConnector>) -> Self {
        self.connector = connector;
        self
    }

    /// Returns the factory's configuration.
    #[must_use]
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Constructs the mapper for `kind`, or for the configured default when
    /// `kind` is `None`.
    #[must_use]
    pub fn create(&self, kind: Option<MapperKind>) -> Box<dyn Mapper> {
        match kind.unwrap_or(self.config.default_kind) {
            MapperKind::Json => Box::new(JsonMapper::new()),
            MapperKind::Xml => Box::new(XmlMapper::new()),
            MapperKind::Ldap => Box::new(LdapMapper::with_connector(
                self.config.servers.clone(),
                Arc::clone(&self.connector),
            )),
        }
    }

    /// Constructs the mapper for a type name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MapperError::UnknownKind`] for names outside the
    /// registered set; type names are matched case-sensitively.
    pub fn create_by_name(&self, name: &str) -> MapperResult<Box<dyn Mapper>> {
        Ok(self.create(Some(name.parse()?)))
    }

    /// Initializes `mapper` and, when its query resolves, runs the legacy
    /// conversion.
    pub fn initialize(&self, mapper: &mut dyn Mapper, params: &MapperParams) {
        mapper.init(params);
        if mapper.current_query().is_some() {
            migrate::convert(self, mapper, params);
        }
    }

    /// Constructs and initializes a mapper in one step.
    #[must_use]
    pub fn create_initialized(
        &self,
        kind: Option<MapperKind>,
        params: &MapperParams,
    ) -> Box<dyn Mapper> {
        let mut mapper = self.create(kind);
        self.initialize(mapper.as_mut(), params);
        mapper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapperError;

    #[test]
    fn create_uses_configured_default() {
        let factory = MapperFactory::new(MapperConfig::new().with_default_kind(MapperKind::Xml));
        assert_eq!(factory.create(None).kind(), MapperKind::Xml);
    }

    #[test]
    fn create_honors_explicit_kind() {
        let factory = MapperFactory::new(MapperConfig::new());
        assert_eq!(factory.create(Some(MapperKind::Ldap)).kind(), MapperKind::Ldap);
        assert_eq!(factory.create(Some(MapperKind::Json)).kind(), MapperKind::Json);
    }

    #[test]
    fn create_by_name_resolves_known_names() {
        let factory = MapperFactory::new(MapperConfig::new());
        assert_eq!(factory.create_by_name("xml").unwrap().kind(), MapperKind::Xml);
    }

    #[test]
    fn create_by_name_rejects_unknown_names() {
        let factory = MapperFactory::new(MapperConfig::new());
        let err = factory.create_by_name("Xml").err().unwrap();
        assert!(matches!(err, MapperError::UnknownKind { .. }));
    }

    #[test]
    fn initialize_selects_the_query_from_params() {
        let factory = MapperFactory::new(MapperConfig::new());
        let mut mapper = factory.create(None);
        factory.initialize(mapper.as_mut(), &MapperParams::new().with_query("prefs/alice"));
        assert_eq!(mapper.current_query(), Some("prefs/alice"));
    }
}
