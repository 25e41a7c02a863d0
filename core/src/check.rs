//! Structural checks for schemas and bundles.
//!
//! Generated schemas satisfy these invariants by construction, but schemas
//! loaded from storage or written by hand may not. [`check_schema`] walks the
//! whole tree (array element types and nested schemas included) and reports
//! every problem it finds.
//!
//! # Examples
//!
//! ```
//! use entity_schema_core::*;
//!
//! let schema = Schema::new("order")
//!     .with_field("status", FieldDef::new(FieldType::Enum(EnumType::new(["OPEN"]))));
//! assert!(check_schema(&schema).is_empty());
//!
//! // Enum with no variants
//! let bad = Schema::new("order")
//!     .with_field("status", FieldDef::new(FieldType::Enum(EnumType::new(Vec::<String>::new()))));
//! assert_eq!(check_schema(&bad), vec![SchemaIssue::EmptyEnum("status".into())]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::validate::full_match_regex;
use crate::{Constraints, FieldType, Schema, SchemaBundle};

/// Structural problems found in a schema or bundle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaIssue {
    /// Bundle version string is empty.
    #[error("bundle version cannot be empty")]
    EmptyBundleVersion,
    /// Two schemas in the same bundle share a name.
    #[error("duplicate schema in bundle: {0}")]
    DuplicateSchema(String),
    /// Schema name is empty; holds the field path for nested schemas.
    #[error("schema name cannot be empty at: {0}")]
    EmptySchemaName(String),
    /// A field key is empty; holds the owning schema's path.
    #[error("field name cannot be empty in: {0}")]
    EmptyFieldName(String),
    /// Enum field declares no variants.
    #[error("enum field declares no variants: {0}")]
    EmptyEnum(String),
    /// Regex constraint does not compile.
    #[error("invalid regex on field {field}: {reason}")]
    InvalidRegex { field: String, reason: String },
    /// Numeric bound is NaN or infinite.
    #[error("non-finite numeric bound on field: {0}")]
    NonFiniteBound(String),
    /// `min_value` exceeds `max_value`.
    #[error("min_value greater than max_value on field: {0}")]
    InvertedValueRange(String),
    /// `min_length` exceeds `max_length`.
    #[error("min_length greater than max_length on field: {0}")]
    InvertedLengthRange(String),
}

/// Checks a bundle and every schema in it.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let mut bundle = SchemaBundle::new("1.0.0", "2024-01-01T00:00:00Z");
/// bundle.schemas.push(Schema::new("user"));
/// assert!(check_bundle(&bundle).is_empty());
///
/// bundle.schemas.push(Schema::new("user"));
/// let issues = check_bundle(&bundle);
/// assert!(issues.iter().any(|e| matches!(e, SchemaIssue::DuplicateSchema(_))));
/// ```
pub fn check_bundle(bundle: &SchemaBundle) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();

    if bundle.version.trim().is_empty() {
        issues.push(SchemaIssue::EmptyBundleVersion);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for schema in &bundle.schemas {
        if !seen.insert(schema.name.as_str()) {
            issues.push(SchemaIssue::DuplicateSchema(schema.name.clone()));
        }
        issues.extend(check_schema(schema));
    }

    issues
}

/// Checks a schema tree for structural problems.
pub fn check_schema(schema: &Schema) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    check_fields(schema, "", &mut issues);
    issues
}

fn check_fields(schema: &Schema, prefix: &str, issues: &mut Vec<SchemaIssue>) {
    if schema.name.trim().is_empty() {
        let at = if prefix.is_empty() { "<root>" } else { prefix };
        issues.push(SchemaIssue::EmptySchemaName(at.to_string()));
    }

    for (name, field) in &schema.fields {
        if name.trim().is_empty() {
            issues.push(SchemaIssue::EmptyFieldName(schema.name.clone()));
            continue;
        }

        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        check_type(&field.field_type, &path, issues);
        if let Some(constraints) = &field.constraints {
            check_constraints(constraints, &path, issues);
        }
    }
}

fn check_type(field_type: &FieldType, path: &str, issues: &mut Vec<SchemaIssue>) {
    match field_type {
        FieldType::Primitive(_) => {}
        FieldType::Enum(e) => {
            if e.variants.is_empty() {
                issues.push(SchemaIssue::EmptyEnum(path.to_string()));
            }
        }
        FieldType::Array(element) => check_type(element, &format!("{path}[]"), issues),
        FieldType::SubSchema(schema) => check_fields(schema, path, issues),
    }
}

fn check_constraints(constraints: &Constraints, path: &str, issues: &mut Vec<SchemaIssue>) {
    let bounds = [constraints.min_value, constraints.max_value];
    if bounds.iter().flatten().any(|b| !b.is_finite()) {
        issues.push(SchemaIssue::NonFiniteBound(path.to_string()));
    } else if let (Some(min), Some(max)) = (constraints.min_value, constraints.max_value) {
        if min > max {
            issues.push(SchemaIssue::InvertedValueRange(path.to_string()));
        }
    }

    if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
        if min > max {
            issues.push(SchemaIssue::InvertedLengthRange(path.to_string()));
        }
    }

    if let Some(pattern) = &constraints.regex {
        if let Err(err) = full_match_regex(pattern) {
            issues.push(SchemaIssue::InvalidRegex {
                field: path.to_string(),
                reason: err.to_string(),
            });
        }
    }
}
