//! Runtime payload validation against a [`Schema`].
//!
//! Validation never fails: every problem, including unparseable bytes, is
//! reported as a [`Violation`] and an empty list means the payload conforms.
//! Fields are checked in schema declaration order and checking does not stop
//! at the first problem.
//!
//! By default nested objects and arrays are only checked for container
//! shape. [`ValidationMode::Deep`] additionally descends into sub-schemas and
//! array elements, bounded by [`ValidationOptions::max_depth`].
//!
//! # Examples
//!
//! ```
//! use entity_schema_core::*;
//!
//! let schema = Schema::new("user").with_field(
//!     "age",
//!     FieldDef::new(FieldType::number())
//!         .with_constraints(Constraints::default().with_value_range(Some(0.0), Some(150.0))),
//! );
//!
//! assert!(validate_payload(br#"{"age": 150}"#, &schema).is_empty());
//!
//! let violations = validate_payload(br#"{"age": 200}"#, &schema);
//! assert_eq!(violations.len(), 1);
//! assert_eq!(
//!     violations[0].to_string(),
//!     "field 'age' value 200 is greater than max 150"
//! );
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::{Constraints, FieldType, PrimitiveType, Schema};

/// Default nesting limit for deep validation.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// One way a payload fails to conform to a schema.
///
/// The `Display` impl is the human-readable message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    /// Payload bytes are not a JSON document.
    #[error("invalid JSON payload: {0}")]
    InvalidPayload(String),
    /// Payload root is not a JSON object.
    #[error("payload must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    /// Required field is absent or null.
    #[error("field '{field}' is required but missing or null")]
    Missing { field: String },
    /// Value has the wrong JSON kind.
    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    /// Value is not one of the enum variants.
    #[error("field '{field}' value '{value}' is not a valid enum variant [{}]", .allowed.join(", "))]
    InvalidEnum {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
    /// Number below `min_value`.
    #[error("field '{field}' value {value} is less than min {min}")]
    BelowMin { field: String, value: f64, min: f64 },
    /// Number above `max_value`.
    #[error("field '{field}' value {value} is greater than max {max}")]
    AboveMax { field: String, value: f64, max: f64 },
    /// String shorter than `min_length`.
    #[error("field '{field}' length {length} is less than min {min}")]
    TooShort {
        field: String,
        length: usize,
        min: u32,
    },
    /// String longer than `max_length`.
    #[error("field '{field}' length {length} is greater than max {max}")]
    TooLong {
        field: String,
        length: usize,
        max: u32,
    },
    /// String does not fully match `regex`.
    #[error("field '{field}' value '{value}' does not match regex '{pattern}'")]
    PatternMismatch {
        field: String,
        value: String,
        pattern: String,
    },
    /// Schema carries a pattern that does not compile.
    #[error("field '{field}' declares invalid regex '{pattern}': {reason}")]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },
    /// Deep validation stopped descending.
    #[error("field '{field}' exceeds maximum validation depth {max_depth}")]
    DepthExceeded { field: String, max_depth: usize },
}

impl Violation {
    /// Path of the offending field, if the violation concerns one.
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_schema_core::Violation;
    ///
    /// let v = Violation::Missing { field: "name".into() };
    /// assert_eq!(v.field(), Some("name"));
    /// assert_eq!(Violation::InvalidPayload("eof".into()).field(), None);
    /// ```
    pub fn field(&self) -> Option<&str> {
        match self {
            Violation::InvalidPayload(_) | Violation::NotAnObject { .. } => None,
            Violation::Missing { field }
            | Violation::WrongType { field, .. }
            | Violation::InvalidEnum { field, .. }
            | Violation::BelowMin { field, .. }
            | Violation::AboveMax { field, .. }
            | Violation::TooShort { field, .. }
            | Violation::TooLong { field, .. }
            | Violation::PatternMismatch { field, .. }
            | Violation::InvalidPattern { field, .. }
            | Violation::DepthExceeded { field, .. } => Some(field),
        }
    }
}

/// How far the validator descends into nested values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Nested objects and arrays are checked for container shape only.
    #[default]
    Shallow,
    /// Nested objects and array elements are validated recursively.
    Deep,
}

/// Validator settings.
///
/// # Examples
///
/// ```
/// use entity_schema_core::{ValidationMode, ValidationOptions};
///
/// let opts: ValidationOptions = serde_json::from_str(r#"{"mode": "deep"}"#).unwrap();
/// assert_eq!(opts.mode, ValidationMode::Deep);
/// assert_eq!(opts.max_depth, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Shallow or deep checking.
    #[serde(default)]
    pub mode: ValidationMode,
    /// Maximum nesting followed in deep mode.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Shallow,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Validates payloads with fixed [`ValidationOptions`].
///
/// Compiled regex constraints are cached by pattern. Clones share the cache,
/// and one instance can be shared across threads.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let address = Schema::new("Address").with_field(
///     "city",
///     FieldDef::new(FieldType::string()).with_constraints(Constraints::required()),
/// );
/// let schema = Schema::new("user")
///     .with_field("home", FieldDef::new(FieldType::sub_schema(address)));
/// let payload = br#"{"home": {}}"#;
///
/// assert!(Validator::default().validate_payload(payload, &schema).is_empty());
///
/// let violations = Validator::deep().validate_payload(payload, &schema);
/// assert_eq!(violations[0].field(), Some("home.city"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidationOptions,
    patterns: Arc<RwLock<HashMap<String, Result<Regex, String>>>>,
}

impl Validator {
    /// Creates a validator with the given options.
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            options,
            patterns: Arc::default(),
        }
    }

    /// Creates a deep validator with the default depth limit.
    pub fn deep() -> Self {
        Self::new(ValidationOptions {
            mode: ValidationMode::Deep,
            ..ValidationOptions::default()
        })
    }

    /// Returns the configured options.
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Parses `payload` as JSON and validates it.
    pub fn validate_payload(&self, payload: &[u8], schema: &Schema) -> Vec<Violation> {
        match serde_json::from_slice::<Value>(payload) {
            Ok(value) => self.validate_value(&value, schema),
            Err(err) => {
                debug!(schema = %schema.name, error = %err, "payload is not valid JSON");
                vec![Violation::InvalidPayload(err.to_string())]
            }
        }
    }

    /// Validates an already parsed document.
    pub fn validate_value(&self, value: &Value, schema: &Schema) -> Vec<Violation> {
        let Some(object) = value.as_object() else {
            return vec![Violation::NotAnObject {
                found: kind_name(value),
            }];
        };

        let mut pass = Pass {
            validator: self,
            violations: Vec::new(),
        };
        pass.object(object, schema, "", 0);

        debug!(
            schema = %schema.name,
            violations = pass.violations.len(),
            "validated payload"
        );
        pass.violations
    }

    /// Full-match regex for `pattern`, compiled on first use.
    fn compiled(&self, pattern: &str) -> Result<Regex, String> {
        let cached = self
            .patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
            .cloned();
        if let Some(hit) = cached {
            return hit;
        }

        let compiled = full_match_regex(pattern).map_err(|err| err.to_string());
        self.patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), compiled.clone());
        compiled
    }
}

/// Validates payload bytes with default (shallow) options.
pub fn validate_payload(payload: &[u8], schema: &Schema) -> Vec<Violation> {
    Validator::default().validate_payload(payload, schema)
}

/// Validates a parsed document with default (shallow) options.
pub fn validate_value(value: &Value, schema: &Schema) -> Vec<Violation> {
    Validator::default().validate_value(value, schema)
}

/// Compiles `pattern` so that it must match the whole input.
pub(crate) fn full_match_regex(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

struct Pass<'a> {
    validator: &'a Validator,
    violations: Vec<Violation>,
}

impl Pass<'_> {
    fn object(&mut self, object: &Map<String, Value>, schema: &Schema, prefix: &str, depth: usize) {
        for (name, def) in &schema.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };

            let Some(node) = object.get(name).filter(|v| !v.is_null()) else {
                if def.is_required() {
                    self.violations.push(Violation::Missing { field: path });
                }
                continue;
            };

            self.check_type(node, &def.field_type, &path, depth);
            if let Some(constraints) = &def.constraints {
                self.check_constraints(node, constraints, &path);
            }
        }
    }

    fn check_type(&mut self, node: &Value, field_type: &FieldType, path: &str, depth: usize) {
        match field_type {
            FieldType::Primitive(primitive) => {
                let matches = match primitive {
                    PrimitiveType::String => node.is_string(),
                    PrimitiveType::Number => node.is_number(),
                    PrimitiveType::Boolean => node.is_boolean(),
                };
                if !matches {
                    self.wrong_type(path, field_type);
                }
            }
            FieldType::Enum(enum_type) => {
                let value = match node.as_str() {
                    Some(s) if enum_type.contains(s) => return,
                    Some(s) => s.to_string(),
                    None => node.to_string(),
                };
                self.violations.push(Violation::InvalidEnum {
                    field: path.to_string(),
                    value,
                    allowed: enum_type.variants.clone(),
                });
            }
            FieldType::Array(element) => {
                let Some(items) = node.as_array() else {
                    self.wrong_type(path, field_type);
                    return;
                };
                if !self.descend(path, depth) {
                    return;
                }
                for (index, item) in items.iter().enumerate() {
                    self.check_type(item, element, &format!("{path}[{index}]"), depth + 1);
                }
            }
            FieldType::SubSchema(schema) => {
                let Some(object) = node.as_object() else {
                    self.wrong_type(path, field_type);
                    return;
                };
                if self.descend(path, depth) {
                    self.object(object, schema, path, depth + 1);
                }
            }
        }
    }

    /// Returns `true` when deep mode allows going one level further.
    fn descend(&mut self, path: &str, depth: usize) -> bool {
        if self.validator.options.mode != ValidationMode::Deep {
            return false;
        }
        if depth >= self.validator.options.max_depth {
            self.violations.push(Violation::DepthExceeded {
                field: path.to_string(),
                max_depth: self.validator.options.max_depth,
            });
            return false;
        }
        true
    }

    fn wrong_type(&mut self, path: &str, expected: &FieldType) {
        self.violations.push(Violation::WrongType {
            field: path.to_string(),
            expected: expected.label(),
        });
    }

    fn check_constraints(&mut self, node: &Value, constraints: &Constraints, path: &str) {
        if let Some(value) = node.as_f64() {
            if let Some(min) = constraints.min_value {
                if value < min {
                    self.violations.push(Violation::BelowMin {
                        field: path.to_string(),
                        value,
                        min,
                    });
                }
            }
            if let Some(max) = constraints.max_value {
                if value > max {
                    self.violations.push(Violation::AboveMax {
                        field: path.to_string(),
                        value,
                        max,
                    });
                }
            }
        }

        if let Some(text) = node.as_str() {
            let length = text.chars().count();
            if let Some(min) = constraints.min_length {
                if length < min as usize {
                    self.violations.push(Violation::TooShort {
                        field: path.to_string(),
                        length,
                        min,
                    });
                }
            }
            if let Some(max) = constraints.max_length {
                if length > max as usize {
                    self.violations.push(Violation::TooLong {
                        field: path.to_string(),
                        length,
                        max,
                    });
                }
            }
            if let Some(pattern) = constraints.regex.as_ref().filter(|p| !p.is_empty()) {
                match self.validator.compiled(pattern) {
                    Ok(re) if re.is_match(text) => {}
                    Ok(_) => self.violations.push(Violation::PatternMismatch {
                        field: path.to_string(),
                        value: text.to_string(),
                        pattern: pattern.clone(),
                    }),
                    Err(err) => self.violations.push(Violation::InvalidPattern {
                        field: path.to_string(),
                        pattern: pattern.clone(),
                        reason: err,
                    }),
                }
            }
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
