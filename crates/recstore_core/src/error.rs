//! Error types for repository operations.

use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur when building or driving a repository.
///
/// Data conditions never surface here - reads degrade to "no data" and
/// writes to a boolean the caller checks. What remains is deployment
/// misconfiguration, which must propagate.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Mapper-layer error, typically an unresolvable backend kind.
    #[error("mapper error: {0}")]
    Mapper(#[from] recstore_mapper::MapperError),
}
