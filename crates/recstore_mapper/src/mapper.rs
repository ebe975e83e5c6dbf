//! Mapper trait definition.

use crate::error::MapperResult;
use crate::kind::MapperKind;
use crate::params::MapperParams;
use crate::record::Record;

/// A storage backend mapper bound to exactly one storage technology.
///
/// A mapper addresses a single logical record through an opaque query and
/// exposes a uniform contract over it: select a target, check existence,
/// read or write the record as structured data or as a serialized string,
/// rename or delete the target.
///
/// # Invariants
///
/// - `select` is a state change only and performs no I/O
/// - `record` reads through to physical storage only when no in-memory copy
///   is held for the current selection; a missing or unreadable backing
///   store yields an empty record, never an error
/// - `set_record` / `set_serialized` never touch physical storage; only
///   `modify` persists
/// - operations a backend does not support return a deterministic `false`,
///   which callers treat as "did not take effect", not as a fatal error
///
/// # Implementors
///
/// - [`super::JsonMapper`] - flat JSON files
/// - [`super::XmlMapper`] - flat XML files
/// - [`super::LdapMapper`] - LDAP directory attribute sets (read-only)
pub trait Mapper: Send {
    /// Returns the backend kind this mapper implements.
    fn kind(&self) -> MapperKind;

    /// (Re)configures the mapper from initialization parameters.
    ///
    /// Clears any cached in-memory record, remembers the parameters, and
    /// selects the query from the parameters when one is present. Safe to
    /// call any number of times.
    fn init(&mut self, params: &MapperParams);

    /// Returns the parameters the mapper was last initialized with.
    fn initialization(&self) -> Option<&MapperParams>;

    /// Binds the mapper to a target named by `query`.
    ///
    /// State change only, no I/O. Selecting a different query drops the
    /// record cached for the previous selection.
    fn select(&mut self, query: &str);

    /// Returns the currently selected query.
    fn current_query(&self) -> Option<&str>;

    /// Reports whether the currently selected target is physically present.
    ///
    /// Backends that cannot answer this report `false`.
    fn exists(&self) -> bool;

    /// Returns the record for the current selection.
    ///
    /// Reads through to physical storage only if no in-memory copy is cached
    /// for the current selection. A missing or unreadable backing store
    /// yields an empty record.
    fn record(&mut self) -> Record;

    /// Returns the canonical serialized form of [`Mapper::record`].
    fn serialized(&mut self) -> String;

    /// Replaces the in-memory record for the current selection.
    ///
    /// Does not touch physical storage.
    fn set_record(&mut self, data: Record);

    /// Replaces the in-memory record by deserializing `data` according to
    /// the backend encoding.
    ///
    /// Does not touch physical storage.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be decoded.
    fn set_serialized(&mut self, data: &str) -> MapperResult<()>;

    /// Persists the in-memory record to physical storage.
    ///
    /// Returns `false` when the target cannot be written (or the backend is
    /// read-only); the in-memory record is left intact so the caller may
    /// retry.
    fn modify(&mut self) -> bool;

    /// Removes the physical target for the current selection.
    ///
    /// A missing target does not count as failure. Returns `false` for
    /// read-only backends.
    fn delete(&mut self) -> bool;

    /// Moves the record to a new query.
    ///
    /// Succeeds trivially when the new query equals the current one. Fails
    /// when a target already exists at the new query. On success the mapper
    /// is re-selected onto the new query.
    fn rename(&mut self, query: &str) -> bool;
}
