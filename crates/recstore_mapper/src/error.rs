//! Error types for mapper operations.

use std::io;
use thiserror::Error;

/// Result type for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors that can occur during mapper operations.
///
/// Most read-path conditions (missing file, empty directory result) are not
/// errors at all - mappers degrade to an empty record. The variants here
/// cover the cases a caller can meaningfully handle or must be told about
/// loudly, such as a misconfigured backend kind.
#[derive(Debug, Error)]
pub enum MapperError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing or writing failed.
    #[error("XML codec error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A base64-encoded XML value body could not be decoded.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes were not valid UTF-8.
    #[error("invalid UTF-8 in decoded value: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A directory server operation failed.
    #[error("directory error: {0}")]
    Directory(#[from] ldap3::LdapError),

    /// An unknown backend kind was requested.
    ///
    /// This is a deployment misconfiguration and the one error class that
    /// should propagate to the caller instead of degrading.
    #[error("unknown mapper kind: {name}")]
    UnknownKind {
        /// The type name that failed to resolve.
        name: String,
    },
}

impl MapperError {
    /// Creates an unknown-kind error.
    pub fn unknown_kind(name: impl Into<String>) -> Self {
        Self::UnknownKind { name: name.into() }
    }
}
