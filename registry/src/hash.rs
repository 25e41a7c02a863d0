//! Content hashing for schema bundles.
//!
//! The hash covers the schemas only (not version or timestamp metadata), so
//! two bundles carrying the same schemas hash identically regardless of when
//! they were built or the order schemas were listed in.

use entity_schema_core::{Schema, SchemaBundle};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};

/// Computes the hex SHA-256 of `schemas`.
///
/// Schemas are sorted by name and serialized as JSON with object keys in
/// lexicographic order before hashing.
///
/// # Examples
///
/// ```
/// use entity_schema_core::Schema;
/// use entity_schema_registry::bundle_hash;
///
/// let a = bundle_hash(&[Schema::new("order"), Schema::new("user")]).unwrap();
/// let b = bundle_hash(&[Schema::new("user"), Schema::new("order")]).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn bundle_hash(schemas: &[Schema]) -> Result<String> {
    let mut sorted: Vec<&Schema> = schemas.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let value = canonicalize(serde_json::to_value(&sorted)?);
    let bytes = serde_json::to_vec(&value)?;
    let hash = Sha256::digest(&bytes);
    Ok(format!("{:x}", hash))
}

/// Fills in `bundle.bundle_hash` from its schemas.
pub fn seal_bundle(bundle: &mut SchemaBundle) -> Result<()> {
    bundle.bundle_hash = Some(bundle_hash(&bundle.schemas)?);
    Ok(())
}

/// Checks `bundle.bundle_hash` against its schemas.
///
/// Bundles without a hash pass unchanged.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidChecksum`] when the stored hash does not
/// match the recomputed one.
pub fn verify_bundle(bundle: &SchemaBundle) -> Result<()> {
    let Some(expected) = &bundle.bundle_hash else {
        return Ok(());
    };

    let actual = bundle_hash(&bundle.schemas)?;
    if !expected.eq_ignore_ascii_case(&actual) {
        return Err(RegistryError::InvalidChecksum(format!(
            "expected {expected}, computed {actual}"
        )));
    }
    Ok(())
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
