//! LDAP directory backend.
//!
//! Read-only: directory entries are managed externally, so every
//! write-class operation reports a deterministic `false`.

use crate::error::MapperResult;
use crate::kind::MapperKind;
use crate::mapper::Mapper;
use crate::params::MapperParams;
use crate::record::{Record, Value};
use ldap3::{LdapConn, Scope, SearchEntry};
use std::sync::Arc;
use tracing::{debug, warn};

/// Connection parameters for one configured directory server.
///
/// Servers are consulted in declaration order; the first server returning a
/// non-empty result set wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryServerConfig {
    /// Server identifier, used in logs.
    pub name: String,
    /// Connection URL, e.g. `ldap://directory.example.com`.
    pub url: String,
    /// Bind DN for simple bind; anonymous when absent.
    pub bind_dn: Option<String>,
    /// Bind password for simple bind.
    pub bind_password: Option<String>,
    /// Search base DN.
    pub base_dn: String,
    /// Filter template for the `user` record type; `{username}` is replaced
    /// with the escaped query.
    pub user_filter: String,
    /// Attribute projection list; all attributes when absent.
    pub attributes: Option<Vec<String>>,
}

impl DirectoryServerConfig {
    /// Creates a server configuration with the default username filter.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user_filter: "(uid={username})".to_owned(),
            ..Self::default()
        }
    }

    /// Sets the search base DN.
    #[must_use]
    pub fn with_base_dn(mut self, base_dn: impl Into<String>) -> Self {
        self.base_dn = base_dn.into();
        self
    }

    /// Sets simple-bind credentials.
    #[must_use]
    pub fn with_bind(mut self, dn: impl Into<String>, password: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self.bind_password = Some(password.into());
        self
    }

    /// Sets the username-lookup filter template.
    #[must_use]
    pub fn with_user_filter(mut self, filter: impl Into<String>) -> Self {
        self.user_filter = filter.into();
        self
    }

    /// Sets the attribute projection list.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

/// A live connection to one directory server.
pub trait Directory {
    /// Runs a subtree search and returns the matching entries as records.
    ///
    /// # Errors
    ///
    /// Returns an error if the search cannot be executed.
    fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: Option<&[String]>,
    ) -> MapperResult<Vec<Record>>;
}

/// Opens [`Directory`] connections from server configurations.
///
/// The production implementation is [`LdapConnector`]; tests substitute a
/// canned directory the same way storage tests substitute an in-memory
/// backend.
pub trait DirectoryConnector: Send + Sync {
    /// Connects (and binds, when credentials are configured) to `server`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or bind fails.
    fn connect(&self, server: &DirectoryServerConfig) -> MapperResult<Box<dyn Directory>>;
}

/// Connects to real LDAP servers with the synchronous `ldap3` client.
#[derive(Debug, Clone, Copy, Default)]
pub struct LdapConnector;

impl DirectoryConnector for LdapConnector {
    fn connect(&self, server: &DirectoryServerConfig) -> MapperResult<Box<dyn Directory>> {
        let mut conn = LdapConn::new(&server.url)?;
        if let (Some(dn), Some(password)) = (&server.bind_dn, &server.bind_password) {
            conn.simple_bind(dn, password)?.success()?;
        }
        Ok(Box::new(LdapDirectory { conn }))
    }
}

struct LdapDirectory {
    conn: LdapConn,
}

impl Directory for LdapDirectory {
    fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: Option<&[String]>,
    ) -> MapperResult<Vec<Record>> {
        let attrs: Vec<String> = match attributes {
            Some(list) => list.to_vec(),
            None => vec!["*".to_owned()],
        };
        let (entries, _result) = self.conn.search(base, Scope::Subtree, filter, attrs)?.success()?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let entry = SearchEntry::construct(entry);
                let mut record = Record::new();
                record.insert("dn".to_owned(), Value::String(entry.dn));
                for (attribute, mut values) in entry.attrs {
                    let value = if values.len() == 1 {
                        Value::String(values.remove(0))
                    } else {
                        Value::Array(values.into_iter().map(Value::String).collect())
                    };
                    record.insert(attribute, value);
                }
                record
            })
            .collect())
    }
}

/// Prepares the search filter for a server depending on the record type.
///
/// The `user` type applies the server's username-lookup template with the
/// query escaped as a filter literal; any other type passes the query
/// through as a raw filter expression.
fn prepare_filter(server: &DirectoryServerConfig, type_tag: Option<&str>, query: &str) -> String {
    match type_tag {
        Some("user") => {
            let username = ldap3::ldap_escape(query);
            server.user_filter.replace("{username}", &username)
        }
        _ => query.to_owned(),
    }
}

/// A mapper that reads one record from an LDAP directory attribute set.
///
/// Configured servers are tried sequentially in declaration order and the
/// scan stops at the first server yielding a non-empty result set; the
/// first result row becomes the record. Results are never merged across
/// servers. A server that cannot be reached is skipped with a warning.
pub struct LdapMapper {
    servers: Vec<DirectoryServerConfig>,
    connector: Arc<dyn DirectoryConnector>,
    data: Option<Record>,
    query: Option<String>,
    init: Option<MapperParams>,
}

impl LdapMapper {
    /// Creates a mapper over `servers` using the real LDAP connector.
    #[must_use]
    pub fn new(servers: Vec<DirectoryServerConfig>) -> Self {
        Self::with_connector(servers, Arc::new(LdapConnector))
    }

    /// Creates a mapper with a custom connector.
    #[must_use]
    pub fn with_connector(
        servers: Vec<DirectoryServerConfig>,
        connector: Arc<dyn DirectoryConnector>,
    ) -> Self {
        Self {
            servers,
            connector,
            data: None,
            query: None,
            init: None,
        }
    }

    fn type_tag(&self) -> Option<&str> {
        self.init.as_ref().and_then(|params| params.type_tag.as_deref())
    }

    /// Scans the configured servers for the current query, first match wins.
    fn lookup(&self) -> Option<Record> {
        let query = self.query.as_deref()?;
        for server in &self.servers {
            let filter = prepare_filter(server, self.type_tag(), query);
            let mut directory = match self.connector.connect(server) {
                Ok(directory) => directory,
                Err(err) => {
                    warn!(server = %server.name, %err, "directory connection failed, trying next server");
                    continue;
                }
            };
            let rows = match directory.search(&server.base_dn, &filter, server.attributes.as_deref())
            {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(server = %server.name, %err, "directory search failed, trying next server");
                    continue;
                }
            };
            if let Some(row) = rows.into_iter().next() {
                debug!(server = %server.name, "directory search matched");
                return Some(row);
            }
        }
        None
    }
}

impl Mapper for LdapMapper {
    fn kind(&self) -> MapperKind {
        MapperKind::Ldap
    }

    fn init(&mut self, params: &MapperParams) {
        self.data = None;
        self.init = Some(params.clone());
        if let Some(query) = params.query.clone() {
            self.select(&query);
        }
    }

    fn initialization(&self) -> Option<&MapperParams> {
        self.init.as_ref()
    }

    fn select(&mut self, query: &str) {
        if self.query.as_deref() != Some(query) {
            self.data = None;
        }
        self.query = Some(query.to_owned());
    }

    fn current_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Directory entries are managed externally; existence checks are not
    /// supported.
    fn exists(&self) -> bool {
        false
    }

    fn record(&mut self) -> Record {
        if let Some(data) = &self.data {
            return data.clone();
        }
        match self.lookup() {
            Some(row) => {
                self.data = Some(row.clone());
                row
            }
            None => Record::new(),
        }
    }

    fn serialized(&mut self) -> String {
        serde_json::to_string(&self.record()).unwrap_or_else(|err| {
            warn!(%err, "cannot serialize record");
            String::new()
        })
    }

    fn set_record(&mut self, data: Record) {
        self.data = Some(data);
    }

    fn set_serialized(&mut self, data: &str) -> MapperResult<()> {
        self.data = Some(serde_json::from_str(data)?);
        Ok(())
    }

    fn modify(&mut self) -> bool {
        false
    }

    fn delete(&mut self) -> bool {
        false
    }

    fn rename(&mut self, _query: &str) -> bool {
        false
    }
}
