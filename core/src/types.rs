//! Schema type definitions for entity payloads.
//!
//! This module defines the schema tree produced by the generator and
//! consumed by the validator. The types are designed for serialization with
//! [`serde`] so the transport layer or a local registry can store them in
//! whatever format it needs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primitive scalar kinds a field can hold.
///
/// # Examples
///
/// ```
/// use entity_schema_core::PrimitiveType;
///
/// assert_eq!(PrimitiveType::Number.label(), "NUMBER");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// Textual value.
    String,
    /// Any integer or floating point value.
    Number,
    /// `true` or `false`.
    Boolean,
}

impl PrimitiveType {
    /// Upper-case label used in violation messages.
    pub fn label(self) -> &'static str {
        match self {
            PrimitiveType::String => "STRING",
            PrimitiveType::Number => "NUMBER",
            PrimitiveType::Boolean => "BOOLEAN",
        }
    }
}

/// Closed set of allowed string values, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Symbolic variant names.
    pub variants: Vec<String>,
}

impl EnumType {
    /// Creates an enum type from variant names.
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `value` is one of the variants (exact match).
    pub fn contains(&self, value: &str) -> bool {
        self.variants.iter().any(|v| v == value)
    }
}

/// Shape of a field's value.
///
/// Exactly one variant is active per instance.
///
/// # Examples
///
/// ```
/// use entity_schema_core::{FieldType, PrimitiveType};
///
/// let tags = FieldType::array(FieldType::Primitive(PrimitiveType::String));
/// assert!(matches!(tags, FieldType::Array(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    /// Scalar value.
    Primitive(PrimitiveType),
    /// One of a fixed set of strings.
    Enum(EnumType),
    /// Sequence whose elements share one type.
    Array(Box<FieldType>),
    /// Nested object described by its own schema.
    SubSchema(Box<Schema>),
}

impl FieldType {
    /// Shorthand for `Primitive(String)`.
    pub fn string() -> Self {
        FieldType::Primitive(PrimitiveType::String)
    }

    /// Shorthand for `Primitive(Number)`.
    pub fn number() -> Self {
        FieldType::Primitive(PrimitiveType::Number)
    }

    /// Shorthand for `Primitive(Boolean)`.
    pub fn boolean() -> Self {
        FieldType::Primitive(PrimitiveType::Boolean)
    }

    /// Array of `element`.
    pub fn array(element: FieldType) -> Self {
        FieldType::Array(Box::new(element))
    }

    /// Nested schema.
    pub fn sub_schema(schema: Schema) -> Self {
        FieldType::SubSchema(Box::new(schema))
    }

    /// Upper-case label used in violation messages.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Primitive(p) => p.label(),
            FieldType::Enum(_) => "ENUM",
            FieldType::Array(_) => "ARRAY",
            FieldType::SubSchema(_) => "OBJECT",
        }
    }
}

/// Optional bounds and patterns a field's value must satisfy.
///
/// Every bound is inclusive. `required` is the only presence knob; it is
/// independent of [`FieldDef::nullable`].
///
/// # Examples
///
/// ```
/// use entity_schema_core::Constraints;
///
/// let c = Constraints::default().with_value_range(Some(0.0), Some(150.0));
/// assert!(!c.required);
/// assert_eq!(c.max_value, Some(150.0));
/// assert!(!c.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Field must be present and non-null.
    #[serde(default)]
    pub required: bool,
    /// Inclusive numeric lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Inclusive numeric upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Inclusive minimum string length (in characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    /// Inclusive maximum string length (in characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Pattern the whole string must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl Constraints {
    /// Constraints with only `required` set.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Sets numeric bounds.
    pub fn with_value_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Sets string length bounds.
    pub fn with_length_range(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Sets the full-match pattern.
    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    /// Returns `true` when nothing is constrained.
    pub fn is_empty(&self) -> bool {
        !self.required
            && self.min_value.is_none()
            && self.max_value.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.regex.is_none()
    }
}

/// Definition of one schema field.
///
/// # Examples
///
/// ```
/// use entity_schema_core::{Constraints, FieldDef, FieldType};
///
/// let name = FieldDef::new(FieldType::string()).with_constraints(Constraints::required());
/// assert!(name.nullable);
/// assert!(name.is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Type of the value.
    pub field_type: FieldType,
    /// Whether an explicit null is acceptable.
    pub nullable: bool,
    /// Store-side policy: a null in a partial update clears the value.
    pub overrides_on_null: bool,
    /// Optional value constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

impl FieldDef {
    /// Creates a nullable field with no constraints.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            nullable: true,
            overrides_on_null: false,
            constraints: None,
        }
    }

    /// Attaches constraints.
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Sets the nullable flag.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the override-on-null policy flag.
    pub fn overrides_on_null(mut self, overrides: bool) -> Self {
        self.overrides_on_null = overrides;
        self
    }

    /// Returns `true` if the field carries `required = true`.
    pub fn is_required(&self) -> bool {
        self.constraints.as_ref().is_some_and(|c| c.required)
    }
}

/// Named collection of field definitions.
///
/// Fields keep their declaration order, which is the order the validator
/// reports violations in. Equality is structural.
///
/// # Examples
///
/// ```
/// use entity_schema_core::{FieldDef, FieldType, Schema};
///
/// let schema = Schema::new("user")
///     .with_field("name", FieldDef::new(FieldType::string()))
///     .with_field("age", FieldDef::new(FieldType::number()));
///
/// assert_eq!(schema.field_names(), vec!["name", "age"]);
/// assert!(schema.field("age").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name (entity name for roots, type name for nested schemas).
    pub name: String,
    /// Field definitions keyed by field name.
    pub fields: IndexMap<String, FieldDef>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds (or replaces) a field.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldDef) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Looks up a field definition.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
