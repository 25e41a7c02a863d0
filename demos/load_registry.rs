//! Schema registry example.
//!
//! Writes generated schemas to a temporary directory, loads them through
//! `SchemaRegistry`, packs them into a hashed bundle, and reloads the bundle
//! through a builder fallback chain.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p entity-schema-demos --example load_registry
//! ```

use std::io::Write;

use entity_schema_core::{Describe, FieldDescriptor, FieldOptions, TypeInfo};
use entity_schema_registry::{RegistryError, SchemaRegistry};

struct Device;

impl Describe for Device {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>(|| {
            vec![
                FieldDescriptor::of::<String>("serial")
                    .with_options(FieldOptions::new().required().regex("[A-F0-9]{12}")),
                FieldDescriptor::of::<f32>("firmware"),
                FieldDescriptor::of::<Vec<u16>>("ports"),
            ]
        })
        .entity("device")
    }
}

struct Reading;

impl Describe for Reading {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>(|| {
            vec![
                FieldDescriptor::of::<String>("device").with_options(FieldOptions::new().required()),
                FieldDescriptor::of::<f64>("celsius").with_options(FieldOptions::new().range(-90.0, 60.0)),
            ]
        })
        .entity("reading")
    }
}

fn main() -> Result<(), RegistryError> {
    let dir = std::env::temp_dir().join("entity_schema_example_registry");
    std::fs::create_dir_all(&dir)?;

    // Generate schemas and persist them one file per schema
    let mut generated = SchemaRegistry::new();
    generated.register::<Device>()?;
    generated.register::<Reading>()?;

    for name in generated.names() {
        if let Some(schema) = generated.get(name) {
            let mut file = std::fs::File::create(dir.join(format!("{name}.json")))?;
            serde_json::to_writer_pretty(&mut file, schema)?;
            file.flush()?;
        }
    }

    let registry = SchemaRegistry::from_dir(&dir)?;
    println!("Loaded {} schemas from {}", registry.len(), dir.display());

    let violations = registry.validate("reading", br#"{"device": "A1", "celsius": 75}"#)?;
    for violation in &violations {
        println!("  reading: {violation}");
    }

    // Pack into a bundle, then load it through a fallback chain
    let bundle = registry.to_bundle("1.0.0", "2026-02-07T00:00:00Z")?;
    let bundle_path = dir.join("bundle.json");
    std::fs::write(&bundle_path, serde_json::to_string_pretty(&bundle)?)?;
    println!(
        "Bundle hash: {}",
        bundle.bundle_hash.as_deref().unwrap_or("<none>")
    );

    let from_bundle = SchemaRegistry::builder()
        .from_dir(dir.join("does-not-exist"))
        .from_bundle(&bundle_path)
        .build()?;
    println!("Fallback chain loaded: {:?}", from_bundle.names());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
