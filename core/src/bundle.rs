use serde::{Deserialize, Serialize};

use crate::Schema;

/// Serializable schema bundle used for caching and distribution.
///
/// A bundle groups multiple [`Schema`] values with version metadata so a
/// registry can be seeded from one file. `bundle_hash`, when present, is
/// verified on load by the registry crate.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let mut bundle = SchemaBundle::new("1.0.0", "2024-01-15T10:30:00Z");
/// bundle.name = Some("orders".into());
/// bundle.schemas.push(Schema::new("order"));
/// bundle.schemas.push(Schema::new("invoice"));
///
/// assert_eq!(bundle.schema_count(), 2);
/// assert!(bundle.get("invoice").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Bundle format version (semver string).
    pub version: String,
    /// Optional bundle name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional bundle description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 timestamp for bundle creation.
    pub generated_at: String,
    /// Optional hex SHA-256 of the bundled schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_hash: Option<String>,
    /// Schemas included in this bundle.
    pub schemas: Vec<Schema>,
}

impl SchemaBundle {
    /// Creates a bundle with required fields.
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: None,
            description: None,
            generated_at: generated_at.into(),
            bundle_hash: None,
            schemas: Vec::new(),
        }
    }

    /// Returns the number of schemas in this bundle.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Finds a schema by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }
}
