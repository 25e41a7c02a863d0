//! Registry configuration.
//!
//! Defines the YAML-serializable configuration that controls where schemas
//! are loaded from and how payloads are validated.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! sources:
//!   directories:
//!     - schemas/
//!   bundles:
//!     - dist/schemas.json
//! validation:
//!   mode: deep
//!   max_depth: 16
//! strict: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use entity_schema_core::ValidationOptions;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader::SchemaRegistry;

/// Locations schemas are loaded from.
///
/// Directories are tried before bundles, each list in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Directories of `*.json` schema files.
    #[serde(default)]
    pub directories: Vec<PathBuf>,
    /// Bundle files.
    #[serde(default)]
    pub bundles: Vec<PathBuf>,
}

impl SourcesConfig {
    /// Returns `true` if no source is configured.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.bundles.is_empty()
    }
}

/// Top-level registry configuration.
///
/// Loaded from a YAML file (typically `entity-schema.yml`).
///
/// # Examples
///
/// ```no_run
/// use entity_schema_registry::RegistryConfig;
///
/// let config = RegistryConfig::load("entity-schema.yml").unwrap();
/// let registry = config.open_registry().unwrap();
/// println!("{} schemas loaded", registry.len());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Schema sources.
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Validator settings.
    #[serde(default)]
    pub validation: ValidationOptions,
    /// Reject sources containing structurally malformed schemas.
    #[serde(default)]
    pub strict: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            sources: SourcesConfig::default(),
            validation: ValidationOptions::default(),
            strict: false,
        }
    }
}

impl RegistryConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RegistryError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Builds a registry from the configured sources.
    ///
    /// # Errors
    ///
    /// Returns [`NoSourcesAvailable`](crate::RegistryError::NoSourcesAvailable)
    /// when no source is configured or none could be loaded.
    pub fn open_registry(&self) -> Result<SchemaRegistry> {
        let mut builder = SchemaRegistry::builder()
            .with_options(self.validation)
            .strict(self.strict);
        for dir in &self.sources.directories {
            builder = builder.from_dir(dir);
        }
        for bundle in &self.sources.bundles {
            builder = builder.from_bundle(bundle);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use entity_schema_core::ValidationMode;

    use super::*;

    const SAMPLE: &str = r#"
version: "1.0"
sources:
  directories:
    - schemas/
  bundles:
    - dist/schemas.json
validation:
  mode: deep
  max_depth: 16
strict: true
"#;

    #[test]
    fn test_parse_sample_yaml() {
        let config: RegistryConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.sources.directories, vec![PathBuf::from("schemas/")]);
        assert_eq!(config.sources.bundles, vec![PathBuf::from("dist/schemas.json")]);
        assert_eq!(config.validation.mode, ValidationMode::Deep);
        assert_eq!(config.validation.max_depth, 16);
        assert!(config.strict);
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config: RegistryConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert!(config.sources.is_empty());
        assert_eq!(config.validation, ValidationOptions::default());
        assert!(!config.strict);
    }

    #[test]
    fn test_missing_version_is_an_error() {
        let result: std::result::Result<RegistryConfig, _> = serde_yaml::from_str("strict: true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = std::env::temp_dir().join("es_reg_test_config_roundtrip");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("entity-schema.yml");

        let mut config = RegistryConfig::default();
        config.sources.directories.push(PathBuf::from("schemas"));
        config.validation.mode = ValidationMode::Deep;
        config.save(&path).unwrap();

        let loaded = RegistryConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_registry_without_sources_fails() {
        let result = RegistryConfig::default().open_registry();
        assert!(matches!(
            result,
            Err(crate::RegistryError::NoSourcesAvailable)
        ));
    }
}
