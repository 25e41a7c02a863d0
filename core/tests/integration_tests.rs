use entity_schema_core::{
    Describe, FieldDescriptor, FieldOptions, FieldType, GenerateError, PrimitiveType, Schema,
    TypeInfo, ValidationMode, ValidationOptions, Validator, Violation, check_schema,
    generate_schema, validate_payload,
};

// ---------------------------------------------------------------------------
// Described types
// ---------------------------------------------------------------------------

struct TestEntity;

impl Describe for TestEntity {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>(|| {
            vec![
                FieldDescriptor::of::<String>("name")
                    .with_options(FieldOptions::new().required()),
                FieldDescriptor::of::<i32>("age"),
            ]
        })
        .entity("test_entity")
    }
}

enum Tier {}

impl Describe for Tier {
    fn type_info() -> TypeInfo {
        TypeInfo::enumeration::<Self>(&["FREE", "PRO"])
    }
}

struct Profile;

impl Describe for Profile {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>(|| {
            vec![
                FieldDescriptor::of::<String>("username").with_options(
                    FieldOptions::new().required().min_length(3).regex("^[a-z]+$"),
                ),
                FieldDescriptor::of::<f64>("age").with_options(FieldOptions::new().range(0.0, 150.0)),
                FieldDescriptor::of::<Tier>("tier").with_options(FieldOptions::new().non_null()),
                FieldDescriptor::of::<Vec<String>>("tags"),
                FieldDescriptor::of::<Option<TestEntity>>("owner"),
            ]
        })
        .entity("profile")
    }
}

struct Loop;

impl Describe for Loop {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>(|| vec![FieldDescriptor::of::<Vec<Loop>>("children")])
            .entity("loop")
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[test]
fn test_generate_test_entity() {
    let schema = generate_schema::<TestEntity>().unwrap();

    assert_eq!(schema.name, "test_entity");
    assert_eq!(schema.len(), 2);

    let name = schema.field("name").unwrap();
    assert_eq!(name.field_type, FieldType::Primitive(PrimitiveType::String));
    assert!(name.constraints.as_ref().unwrap().required);

    let age = schema.field("age").unwrap();
    assert_eq!(age.field_type, FieldType::Primitive(PrimitiveType::Number));
    assert!(age.constraints.is_none());
}

#[test]
fn test_generate_profile_shapes() {
    let schema = generate_schema::<Profile>().unwrap();

    assert_eq!(schema.field_names(), vec!["username", "age", "tier", "tags", "owner"]);
    assert!(matches!(
        &schema.field("tier").unwrap().field_type,
        FieldType::Enum(e) if e.variants == ["FREE", "PRO"]
    ));
    assert!(!schema.field("tier").unwrap().nullable);
    assert_eq!(
        schema.field("tags").unwrap().field_type,
        FieldType::array(FieldType::string())
    );
    assert!(matches!(
        &schema.field("owner").unwrap().field_type,
        FieldType::SubSchema(s) if s.name == "TestEntity" && s.len() == 2
    ));
    assert!(check_schema(&schema).is_empty());
}

#[test]
fn test_generation_is_deterministic() {
    assert_eq!(
        generate_schema::<Profile>().unwrap(),
        generate_schema::<Profile>().unwrap()
    );
}

#[test]
fn test_recursive_type_is_rejected() {
    let err = generate_schema::<Loop>().unwrap_err();
    assert!(matches!(err, GenerateError::RecursiveType { .. }));
}

#[test]
fn test_non_entity_is_rejected() {
    assert!(matches!(
        generate_schema::<Tier>(),
        Err(GenerateError::InvalidEntity(_))
    ));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_conforming_payload_has_no_violations() {
    let schema = generate_schema::<Profile>().unwrap();
    let payload = br#"{
        "username": "alice",
        "age": 30,
        "tier": "PRO",
        "tags": ["a", "b"],
        "owner": {"name": "Bob"}
    }"#;

    assert!(validate_payload(payload, &schema).is_empty());
}

#[test]
fn test_value_above_max() {
    let schema = generate_schema::<Profile>().unwrap();
    let violations = validate_payload(br#"{"username": "alice", "age": 200}"#, &schema);

    assert_eq!(violations.len(), 1);
    let message = violations[0].to_string();
    assert!(message.contains("age"));
    assert!(message.contains("200"));
    assert!(message.contains("150"));
}

#[test]
fn test_inclusive_bounds() {
    let schema = generate_schema::<Profile>().unwrap();

    for age in ["0", "150", "75.5"] {
        let payload = format!(r#"{{"username": "alice", "age": {age}}}"#);
        assert!(validate_payload(payload.as_bytes(), &schema).is_empty(), "age {age}");
    }
    for age in ["-0.5", "150.01"] {
        let payload = format!(r#"{{"username": "alice", "age": {age}}}"#);
        assert_eq!(validate_payload(payload.as_bytes(), &schema).len(), 1, "age {age}");
    }
}

#[test]
fn test_string_constraints_are_independent() {
    let schema = generate_schema::<Profile>().unwrap();
    let violations = validate_payload(br#"{"username": "AB"}"#, &schema);

    assert_eq!(violations.len(), 2);
    assert!(matches!(violations[0], Violation::TooShort { .. }));
    assert!(matches!(violations[1], Violation::PatternMismatch { .. }));
}

#[test]
fn test_missing_required_field() {
    let schema = generate_schema::<TestEntity>().unwrap();

    for payload in [&br#"{"age": 3}"#[..], &br#"{"name": null}"#[..]] {
        let violations = validate_payload(payload, &schema);
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], Violation::Missing { field } if field == "name"));
    }
}

#[test]
fn test_unparseable_payload() {
    let schema = generate_schema::<TestEntity>().unwrap();
    let violations = validate_payload(b"not json", &schema);

    assert_eq!(violations.len(), 1);
    assert!(matches!(violations[0], Violation::InvalidPayload(_)));
}

#[test]
fn test_enum_and_container_violations_in_order() {
    let schema = generate_schema::<Profile>().unwrap();
    let payload = br#"{"username": "alice", "tier": "GOLD", "tags": "a", "owner": 1}"#;
    let violations = validate_payload(payload, &schema);

    let fields: Vec<&str> = violations.iter().filter_map(Violation::field).collect();
    assert_eq!(fields, vec!["tier", "tags", "owner"]);
    assert!(violations[0].to_string().contains("FREE, PRO"));
}

#[test]
fn test_deep_validation_reaches_nested_fields() {
    let schema = generate_schema::<Profile>().unwrap();
    let payload = br#"{"username": "alice", "tags": ["a", 2], "owner": {"age": 1}}"#;

    assert!(validate_payload(payload, &schema).is_empty());

    let deep = Validator::new(ValidationOptions {
        mode: ValidationMode::Deep,
        ..ValidationOptions::default()
    });
    let violations = deep.validate_payload(payload, &schema);
    let fields: Vec<&str> = violations.iter().filter_map(Violation::field).collect();
    assert_eq!(fields, vec!["tags[1]", "owner.name"]);
}

#[test]
fn test_schema_serde_roundtrip_preserves_validation() {
    let schema = generate_schema::<Profile>().unwrap();
    let json = serde_json::to_string(&schema).unwrap();
    let back: Schema = serde_json::from_str(&json).unwrap();

    assert_eq!(back, schema);
    assert_eq!(back.field_names(), schema.field_names());
    assert_eq!(
        validate_payload(br#"{"username": "AB"}"#, &back).len(),
        2
    );
}
