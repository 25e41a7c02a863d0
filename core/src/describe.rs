//! Compile-time type descriptors consumed by the schema generator.
//!
//! Rust has no runtime reflection, so every type that can appear in an entity
//! describes itself through [`Describe`]. A description is a [`TypeInfo`]
//! capability record: a type may be a text/number/bool scalar, expose enum
//! variants, behave as a sequence, or expose named fields. The generator
//! classifies a type by testing these capabilities in a fixed order.
//!
//! Implementations are provided for the standard scalars and collections.
//! Entities and their nested value types implement [`Describe`] by hand:
//!
//! ```
//! use entity_schema_core::{Describe, FieldDescriptor, FieldOptions, TypeInfo};
//!
//! enum Status {
//!     Active,
//!     Suspended,
//! }
//!
//! impl Describe for Status {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::enumeration::<Self>(&["Active", "Suspended"])
//!     }
//! }
//!
//! struct Account {
//!     owner: String,
//!     status: Status,
//! }
//!
//! impl Describe for Account {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::structure::<Self>(|| {
//!             vec![
//!                 FieldDescriptor::of::<String>("owner")
//!                     .with_options(FieldOptions::new().required().min_length(1)),
//!                 FieldDescriptor::of::<Status>("status"),
//!             ]
//!         })
//!         .entity("account")
//!     }
//! }
//!
//! let info = Account::type_info();
//! assert_eq!(info.name, "Account");
//! assert_eq!(info.entity, Some("account"));
//! ```

use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// Scalar capability of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// String-like value.
    Text,
    /// Integer of any width.
    Integer,
    /// Floating point of any width.
    Float,
    /// Boolean.
    Bool,
}

/// Sequence capability of a type.
#[derive(Debug, Clone, Copy)]
pub enum Sequence {
    /// Elements are described by the given function.
    Of(fn() -> TypeInfo),
    /// Element type is not statically known.
    Untyped,
}

/// Capability record describing one type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Simple type name (last path segment, no generics).
    pub name: &'static str,
    /// Fully qualified type name, used as the type's identity.
    pub path: &'static str,
    /// Schema name when the type is tagged as an entity.
    pub entity: Option<&'static str>,
    /// Scalar capability.
    pub scalar: Option<Scalar>,
    /// Enum variant names, in declaration order.
    pub variants: Option<Vec<&'static str>>,
    /// Sequence capability.
    pub sequence: Option<Sequence>,
    /// Named fields, resolved lazily so recursive types can be described.
    pub fields: Option<fn() -> Vec<FieldDescriptor>>,
    /// Value whose shape is only known at runtime (e.g. `serde_json::Value`).
    pub dynamic: bool,
}

impl TypeInfo {
    /// A type with no capabilities.
    pub fn opaque<T: ?Sized>() -> Self {
        let path = std::any::type_name::<T>();
        Self {
            name: simple_name(path),
            path,
            entity: None,
            scalar: None,
            variants: None,
            sequence: None,
            fields: None,
            dynamic: false,
        }
    }

    /// A scalar type.
    pub fn scalar<T: ?Sized>(scalar: Scalar) -> Self {
        Self {
            scalar: Some(scalar),
            ..Self::opaque::<T>()
        }
    }

    /// An enumerated type with the given variant names.
    pub fn enumeration<T: ?Sized>(variants: &[&'static str]) -> Self {
        Self {
            variants: Some(variants.to_vec()),
            ..Self::opaque::<T>()
        }
    }

    /// A sequence whose elements are `E`.
    pub fn sequence_of<T: ?Sized, E: Describe + ?Sized>() -> Self {
        Self {
            sequence: Some(Sequence::Of(E::type_info)),
            ..Self::opaque::<T>()
        }
    }

    /// A sequence whose element type is unknown.
    pub fn untyped_sequence<T: ?Sized>() -> Self {
        Self {
            sequence: Some(Sequence::Untyped),
            ..Self::opaque::<T>()
        }
    }

    /// A structured type exposing named fields.
    pub fn structure<T: ?Sized>(fields: fn() -> Vec<FieldDescriptor>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::opaque::<T>()
        }
    }

    /// A value whose shape is only known at runtime.
    pub fn dynamic<T: ?Sized>() -> Self {
        Self {
            dynamic: true,
            ..Self::opaque::<T>()
        }
    }

    /// Tags the type as an entity with the given schema name.
    pub fn entity(mut self, schema_name: &'static str) -> Self {
        self.entity = Some(schema_name);
        self
    }

    /// Overrides the simple name used for nested schema names.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

/// Types that can describe their own shape.
pub trait Describe {
    /// Returns the type's capability record.
    fn type_info() -> TypeInfo;
}

/// Per-field metadata attached to a [`FieldDescriptor`].
///
/// All constraint values are optional; `nullable` defaults to `true` and
/// `overrides_on_null` to `false`.
///
/// # Examples
///
/// ```
/// use entity_schema_core::FieldOptions;
///
/// let opts = FieldOptions::new().required().range(0.0, 150.0);
/// assert!(opts.required);
/// assert!(opts.nullable);
/// assert_eq!(opts.max, Some(150.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOptions {
    /// Whether an explicit null is acceptable.
    pub nullable: bool,
    /// A null in a partial update clears the stored value.
    pub overrides_on_null: bool,
    /// Field must be present and non-null.
    pub required: bool,
    /// Inclusive numeric lower bound.
    pub min: Option<f64>,
    /// Inclusive numeric upper bound.
    pub max: Option<f64>,
    /// Inclusive minimum string length in characters.
    pub min_length: Option<u32>,
    /// Inclusive maximum string length in characters.
    pub max_length: Option<u32>,
    /// Full-match pattern; an empty pattern means no pattern.
    pub regex: Option<String>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            nullable: true,
            overrides_on_null: false,
            required: false,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            regex: None,
        }
    }
}

impl FieldOptions {
    /// Options with every value at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the field as not nullable.
    pub fn non_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the field as clearing the stored value on null.
    pub fn overrides_on_null(mut self) -> Self {
        self.overrides_on_null = true;
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Inclusive numeric lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive numeric upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Both numeric bounds.
    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    /// Inclusive minimum string length.
    pub fn min_length(mut self, len: u32) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Inclusive maximum string length.
    pub fn max_length(mut self, len: u32) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Full-string match pattern.
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }
}

/// One declared field of a structured type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name as it appears in payloads.
    pub name: String,
    /// Declared type.
    pub ty: fn() -> TypeInfo,
    /// Optional metadata.
    pub options: Option<FieldOptions>,
}

impl FieldDescriptor {
    /// Declares a field of type `T` without metadata.
    pub fn of<T: Describe + ?Sized>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: T::type_info,
            options: None,
        }
    }

    /// Attaches metadata.
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Strips the module path and generic arguments from a type name.
fn simple_name(path: &'static str) -> &'static str {
    let base = path.split('<').next().unwrap_or(path);
    base.rsplit("::").next().unwrap_or(base)
}

macro_rules! describe_scalar {
    ($scalar:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::scalar::<$ty>($scalar)
                }
            }
        )+
    };
}

describe_scalar!(Scalar::Text => String, str, char);
describe_scalar!(Scalar::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_scalar!(Scalar::Float => f32, f64);
describe_scalar!(Scalar::Bool => bool);

macro_rules! describe_sequence {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl<T: Describe> Describe for $ty<T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::sequence_of::<$ty<T>, T>()
                }
            }
        )+
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::sequence_of::<HashSet<T, S>, T>()
    }
}

impl<T: Describe> Describe for [T] {
    fn type_info() -> TypeInfo {
        TypeInfo::sequence_of::<[T], T>()
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::sequence_of::<[T; N], T>()
    }
}

// Wrappers describe as their contents; nullability comes from field metadata.
macro_rules! describe_transparent {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ty<T> {
                fn type_info() -> TypeInfo {
                    T::type_info()
                }
            }
        )+
    };
}

describe_transparent!(Box, Rc, Arc);

impl<T: Describe> Describe for Option<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

impl<T: Describe + ToOwned + ?Sized> Describe for Cow<'_, T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

impl Describe for serde_json::Value {
    fn type_info() -> TypeInfo {
        TypeInfo::dynamic::<serde_json::Value>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name_strips_path_and_generics() {
        assert_eq!(simple_name("alloc::string::String"), "String");
        assert_eq!(simple_name("alloc::vec::Vec<alloc::string::String>"), "Vec");
        assert_eq!(simple_name("u32"), "u32");
    }

    #[test]
    fn test_scalar_descriptions() {
        assert_eq!(String::type_info().scalar, Some(Scalar::Text));
        assert_eq!(<&str>::type_info().scalar, Some(Scalar::Text));
        assert_eq!(u64::type_info().scalar, Some(Scalar::Integer));
        assert_eq!(f32::type_info().scalar, Some(Scalar::Float));
        assert_eq!(bool::type_info().scalar, Some(Scalar::Bool));
    }

    #[test]
    fn test_wrappers_are_transparent() {
        assert_eq!(Option::<i32>::type_info().scalar, Some(Scalar::Integer));
        assert_eq!(Box::<String>::type_info().scalar, Some(Scalar::Text));
        assert_eq!(Arc::<bool>::type_info().scalar, Some(Scalar::Bool));
    }

    #[test]
    fn test_sequence_descriptions() {
        let info = Vec::<u8>::type_info();
        assert!(info.scalar.is_none());
        match info.sequence {
            Some(Sequence::Of(element)) => assert_eq!(element().scalar, Some(Scalar::Integer)),
            other => panic!("expected typed sequence, got {other:?}"),
        }

        assert!(matches!(
            <[String; 3]>::type_info().sequence,
            Some(Sequence::Of(_))
        ));
        assert!(<&[bool]>::type_info().sequence.is_some());
    }

    #[test]
    fn test_field_options_defaults() {
        let opts = FieldOptions::new();
        assert!(opts.nullable);
        assert!(!opts.overrides_on_null);
        assert!(!opts.required);
        assert!(opts.regex.is_none());

        let opts = FieldOptions::new().non_null().overrides_on_null();
        assert!(!opts.nullable);
        assert!(opts.overrides_on_null);
    }

    #[test]
    fn test_json_value_is_dynamic() {
        assert!(serde_json::Value::type_info().dynamic);
    }
}
