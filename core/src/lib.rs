//! Schema generation and payload validation for event-store entities.
//!
//! This crate defines the schema tree shared by clients and the store:
//!
//! - [`Schema`]: a named, ordered map of field definitions.
//! - [`FieldDef`]: nullability, override policy, [`Constraints`] and a
//!   [`FieldType`] for one field.
//! - [`SchemaBundle`]: a versioned set of schemas for caching.
//!
//! Generation ([`generate_schema`]) derives a schema from a type's
//! [`Describe`] implementation. Validation ([`validate_payload`],
//! [`Validator`]) reports every [`Violation`] in an untyped JSON payload.
//! Structural checks ([`check_schema`], [`check_bundle`]) catch malformed
//! schemas obtained from storage.
//!
//! # Example
//!
//! ```
//! use entity_schema_core::*;
//!
//! struct Account;
//!
//! impl Describe for Account {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::structure::<Self>(|| {
//!             vec![
//!                 FieldDescriptor::of::<String>("username").with_options(
//!                     FieldOptions::new().required().min_length(3).regex("^[a-z]+$"),
//!                 ),
//!                 FieldDescriptor::of::<u32>("age"),
//!             ]
//!         })
//!         .entity("account")
//!     }
//! }
//!
//! let schema = generate_schema::<Account>().unwrap();
//! assert!(check_schema(&schema).is_empty());
//!
//! assert!(validate_payload(br#"{"username": "alice", "age": 30}"#, &schema).is_empty());
//! assert_eq!(validate_payload(br#"{"username": "AB"}"#, &schema).len(), 2);
//! ```

mod bundle;
mod check;
mod describe;
mod generate;
mod types;
mod validate;

pub use bundle::SchemaBundle;
pub use check::{SchemaIssue, check_bundle, check_schema};
pub use describe::{Describe, FieldDescriptor, FieldOptions, Scalar, Sequence, TypeInfo};
pub use generate::{GenerateError, generate_from_info, generate_schema};
pub use types::*;
pub use validate::{
    DEFAULT_MAX_DEPTH, ValidationMode, ValidationOptions, Validator, Violation, validate_payload,
    validate_value,
};
