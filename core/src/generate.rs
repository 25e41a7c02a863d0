//! Schema generation from type descriptors.
//!
//! [`generate_schema`] turns an entity's [`TypeInfo`] into a [`Schema`].
//! Each declared field is converted in isolation:
//!
//! 1. `nullable` / `overrides_on_null` come from the field's
//!    [`FieldOptions`], defaulting to `true` / `false`.
//! 2. [`Constraints`] hold only explicitly set values and are omitted when
//!    nothing is set. `required` is never inferred from `nullable`.
//! 3. The declared type is classified in a fixed order: text, number, bool,
//!    enum, sequence, then structured types become nested schemas.
//!
//! Struct types already being expanded are tracked by identity, so a
//! self-referential type graph fails with [`GenerateError::RecursiveType`]
//! instead of recursing forever.
//!
//! # Example
//!
//! ```
//! use entity_schema_core::*;
//!
//! struct TestEntity;
//!
//! impl Describe for TestEntity {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::structure::<Self>(|| {
//!             vec![
//!                 FieldDescriptor::of::<String>("name")
//!                     .with_options(FieldOptions::new().required()),
//!                 FieldDescriptor::of::<f64>("age"),
//!             ]
//!         })
//!         .entity("test_entity")
//!     }
//! }
//!
//! let schema = generate_schema::<TestEntity>().unwrap();
//! assert_eq!(schema.name, "test_entity");
//! assert!(schema.fields["name"].is_required());
//! assert!(schema.fields["age"].constraints.is_none());
//! ```

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::describe::{Describe, FieldDescriptor, FieldOptions, Scalar, Sequence, TypeInfo};
use crate::{Constraints, EnumType, FieldDef, FieldType, PrimitiveType, Schema};

/// Errors raised while generating a schema.
///
/// `field` values are dotted paths from the root entity (`address.city`);
/// array elements are written as `tags[]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The root type is not tagged as an entity or has no fields.
    #[error("type {0} is not a valid entity: missing schema name or field structure")]
    InvalidEntity(String),
    /// A field's type matches no classification rule.
    #[error("unsupported type {type_name} for field {field}")]
    UnsupportedType { field: String, type_name: String },
    /// A struct type contains itself.
    #[error("recursive type {type_name} at field {field}")]
    RecursiveType { field: String, type_name: String },
    /// An enumerated type declares no variants.
    #[error("enum {type_name} at field {field} declares no variants")]
    EmptyEnum { field: String, type_name: String },
    /// A declared field name is empty.
    #[error("type {type_name} declares a field with an empty name")]
    EmptyFieldName { type_name: String },
    /// A field name is declared twice on the same type.
    #[error("type {type_name} declares field {field} more than once")]
    DuplicateField { type_name: String, field: String },
}

/// Generates the schema for entity type `T`.
///
/// # Errors
///
/// See [`GenerateError`]; the most common are
/// [`InvalidEntity`](GenerateError::InvalidEntity) for an untagged root and
/// [`UnsupportedType`](GenerateError::UnsupportedType) for fields with no
/// usable shape.
pub fn generate_schema<T: Describe + ?Sized>() -> Result<Schema, GenerateError> {
    generate_from_info(&T::type_info())
}

/// Generates a schema from an already resolved root description.
///
/// # Errors
///
/// Same as [`generate_schema`].
pub fn generate_from_info(info: &TypeInfo) -> Result<Schema, GenerateError> {
    let (Some(schema_name), Some(fields)) = (info.entity, info.fields) else {
        return Err(GenerateError::InvalidEntity(info.path.to_string()));
    };
    if schema_name.trim().is_empty() {
        return Err(GenerateError::InvalidEntity(info.path.to_string()));
    }

    let mut generator = Generator::default();
    generator.in_progress.insert(info.path);
    let schema = generator.schema(schema_name, info.path, fields(), "")?;

    debug!(
        schema = %schema.name,
        fields = schema.len(),
        "generated schema"
    );
    Ok(schema)
}

#[derive(Default)]
struct Generator {
    in_progress: HashSet<&'static str>,
}

impl Generator {
    fn schema(
        &mut self,
        name: &str,
        type_path: &str,
        descriptors: Vec<FieldDescriptor>,
        prefix: &str,
    ) -> Result<Schema, GenerateError> {
        let mut schema = Schema::new(name);

        for descriptor in descriptors {
            if descriptor.name.is_empty() {
                return Err(GenerateError::EmptyFieldName {
                    type_name: type_path.to_string(),
                });
            }
            if schema.fields.contains_key(&descriptor.name) {
                return Err(GenerateError::DuplicateField {
                    type_name: type_path.to_string(),
                    field: descriptor.name,
                });
            }

            let path = join_path(prefix, &descriptor.name);
            let field = self.field(&descriptor, &path)?;
            schema.fields.insert(descriptor.name, field);
        }

        Ok(schema)
    }

    fn field(&mut self, descriptor: &FieldDescriptor, path: &str) -> Result<FieldDef, GenerateError> {
        let info = (descriptor.ty)();
        let field_type = self.classify(&info, path)?;

        let field = match &descriptor.options {
            Some(options) => FieldDef {
                field_type,
                nullable: options.nullable,
                overrides_on_null: options.overrides_on_null,
                constraints: constraints_from(options),
            },
            None => FieldDef::new(field_type),
        };

        debug!(field = path, kind = field.field_type.label(), "converted field");
        Ok(field)
    }

    fn classify(&mut self, info: &TypeInfo, path: &str) -> Result<FieldType, GenerateError> {
        // Variants win over a text scalar on the same record.
        if let (Some(variants), None | Some(Scalar::Text)) = (&info.variants, info.scalar) {
            if variants.is_empty() {
                return Err(GenerateError::EmptyEnum {
                    field: path.to_string(),
                    type_name: info.path.to_string(),
                });
            }
            return Ok(FieldType::Enum(EnumType::new(variants.iter().copied())));
        }

        match info.scalar {
            Some(Scalar::Text) => return Ok(FieldType::Primitive(PrimitiveType::String)),
            Some(Scalar::Integer | Scalar::Float) => {
                return Ok(FieldType::Primitive(PrimitiveType::Number));
            }
            Some(Scalar::Bool) => return Ok(FieldType::Primitive(PrimitiveType::Boolean)),
            None => {}
        }

        if let Some(sequence) = info.sequence {
            let element = match sequence {
                Sequence::Of(describe) => {
                    let element = describe();
                    if element.dynamic {
                        FieldType::Primitive(PrimitiveType::String)
                    } else {
                        self.classify(&element, &format!("{path}[]"))?
                    }
                }
                Sequence::Untyped => FieldType::Primitive(PrimitiveType::String),
            };
            return Ok(FieldType::Array(Box::new(element)));
        }

        if let Some(fields) = info.fields {
            if !self.in_progress.insert(info.path) {
                return Err(GenerateError::RecursiveType {
                    field: path.to_string(),
                    type_name: info.path.to_string(),
                });
            }
            let nested = self.schema(info.name, info.path, fields(), path)?;
            self.in_progress.remove(info.path);
            return Ok(FieldType::SubSchema(Box::new(nested)));
        }

        Err(GenerateError::UnsupportedType {
            field: path.to_string(),
            type_name: info.path.to_string(),
        })
    }
}

fn constraints_from(options: &FieldOptions) -> Option<Constraints> {
    let constraints = Constraints {
        required: options.required,
        min_value: options.min,
        max_value: options.max,
        min_length: options.min_length,
        max_length: options.max_length,
        regex: options.regex.clone().filter(|r| !r.is_empty()),
    };
    (!constraints.is_empty()).then_some(constraints)
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
