//! # recstore mapper
//!
//! Backend mapper contract and storage backends for recstore.
//!
//! A mapper addresses one logical record through an opaque query and exposes
//! a uniform contract over interchangeable storage technologies. This crate
//! provides:
//!
//! - the [`Mapper`] trait - select, read, write, serialize, rename, delete
//! - [`JsonMapper`] - one record per flat JSON file
//! - [`XmlMapper`] - one record per flat XML file with base64 value bodies
//! - [`LdapMapper`] - read-only records from an LDAP directory
//! - [`MapperFactory`] - kind resolution and factory-mediated initialization
//! - [`migrate`] - one-time, idempotent legacy backend conversion
//!
//! ## Design Principles
//!
//! - Missing data is not an error: reads degrade to an empty record
//! - Unsupported operations return a deterministic `false`
//! - Only `modify` touches physical storage; everything else is in-memory
//! - Unknown backend kinds fail loudly - they are deployment errors
//!
//! ## Example
//!
//! ```no_run
//! use recstore_mapper::{MapperConfig, MapperFactory, MapperParams};
//!
//! let factory = MapperFactory::new(MapperConfig::new());
//! let mut mapper = factory.create_initialized(
//!     None,
//!     &MapperParams::new().with_query("prefs/alice"),
//! );
//! let data = mapper.record();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod factory;
mod file;
mod json;
mod kind;
mod ldap;
mod mapper;
pub mod migrate;
mod params;
mod record;
mod xml;

pub use error::{MapperError, MapperResult};
pub use factory::{MapperConfig, MapperFactory};
pub use json::JsonMapper;
pub use kind::MapperKind;
pub use ldap::{
    Directory, DirectoryConnector, DirectoryServerConfig, LdapConnector, LdapMapper,
};
pub use mapper::Mapper;
pub use params::MapperParams;
pub use record::{record_from, Record, Value};
pub use xml::XmlMapper;
