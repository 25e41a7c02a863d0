//! Local schema registry for entity payload validation.
//!
//! This crate loads [`Schema`](entity_schema_core::Schema) values from a
//! directory of JSON files or from a hashed
//! [`SchemaBundle`](entity_schema_core::SchemaBundle), keeps them in memory by
//! name, and validates payloads against them. A YAML [`RegistryConfig`]
//! describes the sources and validator settings.
//!
//! # Quick start
//!
//! ```no_run
//! use entity_schema_registry::{RegistryConfig, SchemaRegistry};
//!
//! // Load schemas from a directory
//! let registry = SchemaRegistry::from_dir("schemas/").unwrap();
//! let violations = registry.validate("user", br#"{"name": "Ada"}"#).unwrap();
//! for v in &violations {
//!     println!("{v}");
//! }
//!
//! // Or from a configuration file with fallback sources
//! let registry = RegistryConfig::load("entity-schema.yml")
//!     .unwrap()
//!     .open_registry()
//!     .unwrap();
//! ```

mod config;
mod error;
mod hash;
mod loader;

pub use config::{RegistryConfig, SourcesConfig};
pub use error::{RegistryError, Result};
pub use hash::{bundle_hash, seal_bundle, verify_bundle};
pub use loader::{RegistryBuilder, RegistrySource, SchemaRegistry, read_schema};
