//! Schema registry loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaRegistry`] for in-memory schema lookup and payload
//! validation, and [`RegistryBuilder`] for constructing a registry from
//! multiple sources with automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use entity_schema_registry::SchemaRegistry;
//!
//! // Load from a directory of JSON schema files
//! let registry = SchemaRegistry::from_dir("schemas/").unwrap();
//! assert!(registry.get("user").is_some());
//!
//! // Load from a single SchemaBundle JSON file
//! let registry = SchemaRegistry::from_bundle("schemas.json").unwrap();
//!
//! // Use the builder for a fallback chain
//! let registry = SchemaRegistry::builder()
//!     .from_dir("schemas/")
//!     .from_bundle("schemas.json")
//!     .strict(true)
//!     .build()
//!     .unwrap();
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use entity_schema_core::{
    Describe, Schema, SchemaBundle, SchemaIssue, ValidationOptions, Validator, Violation,
    check_bundle, check_schema, generate_schema,
};
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::hash::{seal_bundle, verify_bundle};

/// Describes where a [`SchemaRegistry`] was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrySource {
    /// Built in memory via [`SchemaRegistry::new`].
    Memory,
    /// Loaded from a directory of individual JSON schema files.
    Directory(PathBuf),
    /// Loaded from a single [`SchemaBundle`] JSON file.
    Bundle(PathBuf),
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<RegistrySource>),
}

/// In-memory collection of schemas keyed by schema name.
///
/// # Examples
///
/// ```
/// use entity_schema_core::{Constraints, FieldDef, FieldType, Schema};
/// use entity_schema_registry::SchemaRegistry;
///
/// let mut registry = SchemaRegistry::new();
/// registry.insert(Schema::new("user").with_field(
///     "name",
///     FieldDef::new(FieldType::string()).with_constraints(Constraints::required()),
/// ));
///
/// let violations = registry.validate("user", br#"{"name": null}"#).unwrap();
/// assert_eq!(violations.len(), 1);
/// assert!(registry.validate("order", b"{}").is_err());
/// ```
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
    source: RegistrySource,
    validator: Validator,
}

impl SchemaRegistry {
    /// Creates an empty registry with shallow validation.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            source: RegistrySource::Memory,
            validator: Validator::default(),
        }
    }

    /// Returns a new [`RegistryBuilder`] for configuring a fallback chain.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Loads schemas from a directory of `*.json` files.
    ///
    /// Each file is parsed as a [`Schema`] and indexed by its `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the directory cannot be read or a
    /// file cannot be opened, or [`RegistryError::JsonError`] if any file
    /// contains invalid JSON.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_dir(path.as_ref(), false)
    }

    fn load_dir(path: &Path, strict: bool) -> Result<Self> {
        let mut schemas = HashMap::new();

        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let schema = read_schema(&file_path)?;
            if schemas.contains_key(&schema.name) {
                if strict {
                    return Err(RegistryError::InvalidSchema {
                        details: SchemaIssue::DuplicateSchema(schema.name.clone()).to_string(),
                        name: schema.name,
                    });
                }
                warn!(schema = %schema.name, file = %file_path.display(), "duplicate schema name, replacing");
            }
            schemas.insert(schema.name.clone(), schema);
        }

        let registry = Self {
            schemas,
            source: RegistrySource::Directory(path.to_path_buf()),
            validator: Validator::default(),
        };
        if strict {
            registry.reject_malformed()?;
        }

        info!(count = registry.len(), dir = %path.display(), "loaded schemas from directory");
        Ok(registry)
    }

    /// Loads schemas from a single [`SchemaBundle`] JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the file cannot be read,
    /// [`RegistryError::JsonError`] if parsing fails, or
    /// [`RegistryError::InvalidChecksum`] if the bundle carries a hash that
    /// does not match its schemas.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_bundle(path.as_ref(), false)
    }

    fn load_bundle(path: &Path, strict: bool) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let bundle: SchemaBundle = serde_json::from_reader(reader)?;
        verify_bundle(&bundle)?;

        // Bundle-level issues must be seen before duplicates collapse.
        let issues = check_bundle(&bundle);
        if !issues.is_empty() {
            if strict {
                return Err(RegistryError::InvalidSchema {
                    name: bundle
                        .name
                        .clone()
                        .unwrap_or_else(|| path.display().to_string()),
                    details: join_issues(&issues),
                });
            }
            for issue in &issues {
                warn!(bundle = %path.display(), issue = %issue, "malformed bundle entry");
            }
        }

        let schemas: HashMap<String, Schema> = bundle
            .schemas
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();

        info!(
            count = schemas.len(),
            bundle = %path.display(),
            version = %bundle.version,
            "loaded schemas from bundle"
        );
        Ok(Self {
            schemas,
            source: RegistrySource::Bundle(path.to_path_buf()),
            validator: Validator::default(),
        })
    }

    /// Replaces the validator used by [`validate`](Self::validate).
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.validator = Validator::new(options);
        self
    }

    /// Looks up a schema by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Inserts a schema under its own name, returning any schema it replaced.
    pub fn insert(&mut self, schema: Schema) -> Option<Schema> {
        self.schemas.insert(schema.name.clone(), schema)
    }

    /// Generates the schema for `T` and inserts it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::GenerateError`] if `T` cannot be described as
    /// an entity schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_schema_core::{Describe, FieldDescriptor, TypeInfo};
    /// use entity_schema_registry::SchemaRegistry;
    ///
    /// struct Tag;
    ///
    /// impl Describe for Tag {
    ///     fn type_info() -> TypeInfo {
    ///         TypeInfo::structure::<Self>(|| vec![FieldDescriptor::of::<String>("label")])
    ///             .entity("tag")
    ///     }
    /// }
    ///
    /// let mut registry = SchemaRegistry::new();
    /// let schema = registry.register::<Tag>().unwrap();
    /// assert_eq!(schema.name, "tag");
    /// assert!(registry.contains("tag"));
    /// ```
    pub fn register<T: Describe + ?Sized>(&mut self) -> Result<&Schema> {
        let schema = generate_schema::<T>()?;
        debug!(schema = %schema.name, fields = schema.len(), "registered generated schema");
        let slot = self.schemas.entry(schema.name.clone()).or_default();
        *slot = schema;
        Ok(slot)
    }

    /// Returns `true` if a schema named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the number of schemas in the registry.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if the registry holds no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &RegistrySource {
        &self.source
    }

    /// Returns the validator settings in effect.
    pub fn options(&self) -> &ValidationOptions {
        self.validator.options()
    }

    /// Validates `payload` against the schema registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSchema`] if no such schema exists.
    /// Payload problems are never errors; they are returned as violations.
    pub fn validate(&self, name: &str, payload: &[u8]) -> Result<Vec<Violation>> {
        let schema = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownSchema(name.to_string()))?;
        Ok(self.validator.validate_payload(payload, schema))
    }

    /// Runs structural checks over every schema, sorted by schema name.
    ///
    /// Schemas without issues are omitted.
    pub fn check(&self) -> Vec<(String, Vec<SchemaIssue>)> {
        let mut report: Vec<(String, Vec<SchemaIssue>)> = self
            .schemas
            .values()
            .map(|s| (s.name.clone(), check_schema(s)))
            .filter(|(_, issues)| !issues.is_empty())
            .collect();
        report.sort_by(|a, b| a.0.cmp(&b.0));
        report
    }

    /// Packs every schema into a hashed [`SchemaBundle`], sorted by name.
    pub fn to_bundle(
        &self,
        version: impl Into<String>,
        generated_at: impl Into<String>,
    ) -> Result<SchemaBundle> {
        let mut bundle = SchemaBundle::new(version, generated_at);
        bundle.schemas = self.schemas.values().cloned().collect();
        bundle.schemas.sort_by(|a, b| a.name.cmp(&b.name));
        seal_bundle(&mut bundle)?;
        Ok(bundle)
    }

    fn reject_malformed(&self) -> Result<()> {
        match self.check().into_iter().next() {
            None => Ok(()),
            Some((name, issues)) => Err(RegistryError::InvalidSchema {
                name,
                details: join_issues(&issues),
            }),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reads one schema from a JSON file.
///
/// # Errors
///
/// Returns [`RegistryError::IoError`] or [`RegistryError::JsonError`].
pub fn read_schema(path: impl AsRef<Path>) -> Result<Schema> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Builder for constructing a [`SchemaRegistry`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`RegistryError::NoSourcesAvailable`] is returned. In
/// strict mode a source whose schemas fail structural checks counts as failed,
/// including duplicate names and an empty bundle version.
///
/// # Example
///
/// ```no_run
/// use entity_schema_core::{ValidationMode, ValidationOptions};
/// use entity_schema_registry::SchemaRegistry;
///
/// let registry = SchemaRegistry::builder()
///     .from_dir("/opt/schemas/")
///     .from_bundle("/opt/schemas.json")
///     .with_options(ValidationOptions { mode: ValidationMode::Deep, max_depth: 8 })
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    sources: Vec<RegistrySource>,
    options: ValidationOptions,
    strict: bool,
}

impl RegistryBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of JSON schema files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::Directory(path.into()));
        self
    }

    /// Adds a [`SchemaBundle`] file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::Bundle(path.into()));
        self
    }

    /// Sets the validator options of the built registry.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Rejects sources containing structurally malformed schemas.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Attempts to load schemas from configured sources in order.
    ///
    /// Returns the first successfully loaded registry. If all sources fail,
    /// returns [`RegistryError::NoSourcesAvailable`].
    pub fn build(self) -> Result<SchemaRegistry> {
        if self.sources.is_empty() {
            return Err(RegistryError::NoSourcesAvailable);
        }

        for source in &self.sources {
            let loaded = match source {
                RegistrySource::Directory(path) => SchemaRegistry::load_dir(path, self.strict),
                RegistrySource::Bundle(path) => SchemaRegistry::load_bundle(path, self.strict),
                RegistrySource::Memory | RegistrySource::Multiple(_) => continue,
            };

            match loaded {
                Ok(mut registry) => {
                    registry.source = RegistrySource::Multiple(self.sources.clone());
                    registry.validator = Validator::new(self.options);
                    return Ok(registry);
                }
                Err(err) => warn!(source = ?source, error = %err, "schema source unavailable"),
            }
        }

        Err(RegistryError::NoSourcesAvailable)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use entity_schema_core::{Constraints, EnumType, FieldDef, FieldType, ValidationMode};

    use super::*;

    fn test_schema(name: &str) -> Schema {
        Schema::new(name).with_field(
            "id",
            FieldDef::new(FieldType::string()).with_constraints(Constraints::required()),
        )
    }

    fn write_schema(dir: &Path, schema: &Schema) {
        let path = dir.join(format!("{}.json", schema.name));
        let mut f = std::fs::File::create(path).unwrap();
        serde_json::to_writer_pretty(&mut f, schema).unwrap();
        f.flush().unwrap();
    }

    fn write_bundle(path: &Path, bundle: &SchemaBundle) {
        let mut f = std::fs::File::create(path).unwrap();
        serde_json::to_writer_pretty(&mut f, bundle).unwrap();
        f.flush().unwrap();
    }

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_from_dir() {
        let dir = fresh_dir("es_reg_test_from_dir");
        write_schema(&dir, &test_schema("user"));
        write_schema(&dir, &test_schema("order"));
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let registry = SchemaRegistry::from_dir(&dir).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["order", "user"]);
        assert_eq!(registry.source(), &RegistrySource::Directory(dir.clone()));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_dir_rejects_bad_json() {
        let dir = fresh_dir("es_reg_test_bad_json");
        std::fs::write(dir.join("broken.json"), "{ not json").unwrap();

        let result = SchemaRegistry::from_dir(&dir);
        assert!(matches!(result, Err(RegistryError::JsonError(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_bundle_verifies_hash() {
        let dir = fresh_dir("es_reg_test_bundle_hash");
        let path = dir.join("bundle.json");

        let mut bundle = SchemaBundle::new("1.0.0", "2026-02-07T00:00:00Z");
        bundle.schemas.push(test_schema("user"));
        seal_bundle(&mut bundle).unwrap();
        write_bundle(&path, &bundle);

        let registry = SchemaRegistry::from_bundle(&path).unwrap();
        assert!(registry.contains("user"));

        bundle.schemas.push(test_schema("order"));
        write_bundle(&path, &bundle);
        let result = SchemaRegistry::from_bundle(&path);
        assert!(matches!(result, Err(RegistryError::InvalidChecksum(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_builder_fallback_first_fails() {
        let dir = fresh_dir("es_reg_test_builder_fb");
        let path = dir.join("bundle.json");

        let mut bundle = SchemaBundle::new("1.0.0", "2026-02-07T00:00:00Z");
        bundle.schemas.push(test_schema("order"));
        write_bundle(&path, &bundle);

        let registry = SchemaRegistry::builder()
            .from_dir("/nonexistent/entity-schemas/")
            .from_bundle(&path)
            .build()
            .unwrap();
        assert!(registry.contains("order"));
        assert!(matches!(registry.source(), RegistrySource::Multiple(s) if s.len() == 2));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_builder_all_fail() {
        let result = SchemaRegistry::builder()
            .from_dir("/nonexistent/dir1/")
            .from_bundle("/nonexistent/bundle1.json")
            .build();
        assert!(matches!(result, Err(RegistryError::NoSourcesAvailable)));

        let result = SchemaRegistry::builder().build();
        assert!(matches!(result, Err(RegistryError::NoSourcesAvailable)));
    }

    #[test]
    fn test_builder_strict_skips_malformed_source() {
        let bad_dir = fresh_dir("es_reg_test_strict_bad");
        let good_dir = fresh_dir("es_reg_test_strict_good");
        let broken = Schema::new("status").with_field(
            "value",
            FieldDef::new(FieldType::Enum(EnumType::new(Vec::<String>::new()))),
        );
        write_schema(&bad_dir, &broken);
        write_schema(&good_dir, &test_schema("user"));

        let lenient = SchemaRegistry::builder()
            .from_dir(&bad_dir)
            .from_dir(&good_dir)
            .build()
            .unwrap();
        assert!(lenient.contains("status"));
        assert_eq!(lenient.check().len(), 1);

        let strict = SchemaRegistry::builder()
            .from_dir(&bad_dir)
            .from_dir(&good_dir)
            .strict(true)
            .build()
            .unwrap();
        assert!(strict.contains("user"));
        assert!(!strict.contains("status"));

        std::fs::remove_dir_all(&bad_dir).ok();
        std::fs::remove_dir_all(&good_dir).ok();
    }

    #[test]
    fn test_builder_applies_options() {
        let dir = fresh_dir("es_reg_test_options");
        write_schema(&dir, &test_schema("user"));

        let options = ValidationOptions {
            mode: ValidationMode::Deep,
            max_depth: 4,
        };
        let registry = SchemaRegistry::builder()
            .from_dir(&dir)
            .with_options(options)
            .build()
            .unwrap();
        assert_eq!(registry.options(), &options);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_insert_and_validate() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.insert(test_schema("user")).is_none());
        assert!(registry.insert(test_schema("user")).is_some());
        assert_eq!(registry.len(), 1);

        assert!(registry.validate("user", br#"{"id": "u-1"}"#).unwrap().is_empty());
        assert_eq!(registry.validate("user", b"{}").unwrap().len(), 1);
        assert!(matches!(
            registry.validate("ghost", b"{}"),
            Err(RegistryError::UnknownSchema(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_to_bundle_is_sorted_and_sealed() {
        let mut registry = SchemaRegistry::new();
        registry.insert(test_schema("user"));
        registry.insert(test_schema("account"));

        let bundle = registry.to_bundle("1.0.0", "2026-02-07T00:00:00Z").unwrap();
        let names: Vec<&str> = bundle.schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["account", "user"]);
        assert!(bundle.bundle_hash.is_some());
        assert!(verify_bundle(&bundle).is_ok());
    }

    #[test]
    fn test_builder_strict_rejects_malformed_bundle() {
        let dir = fresh_dir("es_reg_test_strict_bundle");
        let path = dir.join("bundle.json");

        let mut bundle = SchemaBundle::new("", "2026-02-07T00:00:00Z");
        bundle.schemas.push(test_schema("user"));
        bundle.schemas.push(
            Schema::new("user").with_field("b", FieldDef::new(FieldType::string())),
        );
        seal_bundle(&mut bundle).unwrap();
        write_bundle(&path, &bundle);

        let lenient = SchemaRegistry::from_bundle(&path).unwrap();
        assert_eq!(lenient.len(), 1);

        let err = SchemaRegistry::load_bundle(&path, true).unwrap_err();
        match err {
            RegistryError::InvalidSchema { details, .. } => {
                assert!(details.contains("bundle version cannot be empty"));
                assert!(details.contains("duplicate schema in bundle: user"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let result = SchemaRegistry::builder().from_bundle(&path).strict(true).build();
        assert!(matches!(result, Err(RegistryError::NoSourcesAvailable)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_builder_strict_rejects_duplicate_names_in_directory() {
        let dir = fresh_dir("es_reg_test_strict_dupes");
        write_schema(&dir, &test_schema("user"));
        let copy = dir.join("user-copy.json");
        std::fs::copy(dir.join("user.json"), &copy).unwrap();

        assert_eq!(SchemaRegistry::from_dir(&dir).unwrap().len(), 1);
        assert!(matches!(
            SchemaRegistry::load_dir(&dir, true),
            Err(RegistryError::InvalidSchema { name, .. }) if name == "user"
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
