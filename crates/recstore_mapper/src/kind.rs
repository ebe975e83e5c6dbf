//! Backend kind identities.

use crate::error::MapperError;
use std::fmt;
use std::str::FromStr;

/// The identity of a storage backend.
///
/// A kind determines which mapper implementation the factory constructs and
/// the on-disk encoding of file-backed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapperKind {
    /// Flat JSON files, one object per record.
    Json,
    /// Flat XML files, one element per top-level key.
    Xml,
    /// An LDAP directory attribute set (read-only).
    Ldap,
}

impl MapperKind {
    /// Returns the canonical type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Ldap => "ldap",
        }
    }

    /// Returns the file extension for file-backed kinds.
    ///
    /// `None` for kinds that do not address files.
    #[must_use]
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("json"),
            Self::Xml => Some("xml"),
            Self::Ldap => None,
        }
    }
}

impl fmt::Display for MapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapperKind {
    type Err = MapperError;

    /// Resolves a type name. Matching is case-sensitive; unknown names are a
    /// configuration error.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "ldap" => Ok(Self::Ldap),
            _ => Err(MapperError::unknown_kind(name)),
        }
    }
}
