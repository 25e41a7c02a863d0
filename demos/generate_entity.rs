//! Schema generation example.
//!
//! Shows how an entity type describes itself through [`Describe`] and how
//! `generate_schema` turns that description into a [`Schema`].
//!
//! # Usage
//!
//! ```bash
//! cargo run -p entity-schema-demos --example generate_entity
//! ```

use entity_schema_core::{
    Describe, FieldDescriptor, FieldOptions, FieldType, TypeInfo, generate_schema,
};

#[allow(dead_code)]
enum Status {
    Active,
    Suspended,
    Closed,
}

impl Describe for Status {
    fn type_info() -> TypeInfo {
        TypeInfo::enumeration::<Self>(&["ACTIVE", "SUSPENDED", "CLOSED"])
    }
}

#[allow(dead_code)]
struct Address {
    street: String,
    city: String,
    postcode: Option<String>,
}

impl Describe for Address {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>(|| {
            vec![
                FieldDescriptor::of::<String>("street"),
                FieldDescriptor::of::<String>("city").with_options(FieldOptions::new().required()),
                FieldDescriptor::of::<Option<String>>("postcode")
                    .with_options(FieldOptions::new().regex("[0-9]{5}")),
            ]
        })
    }
}

#[allow(dead_code)]
struct Member {
    handle: String,
    age: u8,
    status: Status,
    verified: bool,
    emails: Vec<String>,
    address: Option<Address>,
}

impl Describe for Member {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>(|| {
            vec![
                FieldDescriptor::of::<String>("handle").with_options(
                    FieldOptions::new()
                        .required()
                        .non_null()
                        .min_length(3)
                        .max_length(24)
                        .regex("[a-z][a-z0-9_]*"),
                ),
                FieldDescriptor::of::<u8>("age").with_options(FieldOptions::new().range(13.0, 130.0)),
                FieldDescriptor::of::<Status>("status")
                    .with_options(FieldOptions::new().overrides_on_null()),
                FieldDescriptor::of::<bool>("verified"),
                FieldDescriptor::of::<Vec<String>>("emails"),
                FieldDescriptor::of::<Option<Address>>("address"),
            ]
        })
        .entity("member")
    }
}

fn main() {
    let schema = match generate_schema::<Member>() {
        Ok(schema) => schema,
        Err(err) => {
            eprintln!("generation failed: {err}");
            std::process::exit(1);
        }
    };

    println!("Schema '{}' with {} fields:", schema.name, schema.len());
    for (name, field) in &schema.fields {
        let required = if field.is_required() { " (required)" } else { "" };
        match &field.field_type {
            FieldType::Enum(e) => println!("  {name}: ENUM [{}]{required}", e.variants.join(", ")),
            FieldType::SubSchema(nested) => {
                println!("  {name}: OBJECT '{}'{required}", nested.name);
                for nested_name in nested.field_names() {
                    println!("    {nested_name}");
                }
            }
            other => println!("  {name}: {}{required}", other.label()),
        }
    }

    println!("\n=== JSON ===");
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("serialization failed: {err}"),
    }
}
