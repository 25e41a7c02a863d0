//! Payload validation example.
//!
//! Builds a schema by hand and validates a few payloads against it, in both
//! shallow and deep mode.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p entity-schema-demos --example validate_payload
//! ```

use entity_schema_core::{
    Constraints, EnumType, FieldDef, FieldType, Schema, Validator, validate_payload,
};

fn order_schema() -> Schema {
    let line = Schema::new("OrderLine")
        .with_field(
            "sku",
            FieldDef::new(FieldType::string()).with_constraints(Constraints::required()),
        )
        .with_field(
            "quantity",
            FieldDef::new(FieldType::number())
                .with_constraints(Constraints::default().with_value_range(Some(1.0), None)),
        );

    Schema::new("order")
        .with_field(
            "id",
            FieldDef::new(FieldType::string()).with_constraints(
                Constraints::required()
                    .with_length_range(Some(8), Some(8))
                    .with_regex("[A-Z0-9]+"),
            ),
        )
        .with_field(
            "state",
            FieldDef::new(FieldType::Enum(EnumType::new(["OPEN", "PAID", "SHIPPED"]))),
        )
        .with_field(
            "total",
            FieldDef::new(FieldType::number())
                .with_constraints(Constraints::default().with_value_range(Some(0.0), None)),
        )
        .with_field("lines", FieldDef::new(FieldType::array(FieldType::sub_schema(line))))
}

fn report(label: &str, violations: &[entity_schema_core::Violation]) {
    if violations.is_empty() {
        println!("{label}: valid");
        return;
    }
    println!("{label}: {} violation(s)", violations.len());
    for violation in violations {
        println!("  - {violation}");
    }
}

fn main() {
    let schema = order_schema();

    let payloads: [(&str, &[u8]); 4] = [
        (
            "conforming",
            br#"{"id": "AB12CD34", "state": "PAID", "total": 42.5, "lines": [{"sku": "X1", "quantity": 2}]}"#,
        ),
        ("bad id and state", br#"{"id": "ab-1", "state": "LOST"}"#),
        ("missing id", br#"{"total": -1}"#),
        ("not json", b"{ \"id\": "),
    ];

    println!("=== Shallow ===");
    for (label, payload) in payloads {
        report(label, &validate_payload(payload, &schema));
    }

    println!("\n=== Deep ===");
    let deep = Validator::deep();
    let nested = br#"{"id": "AB12CD34", "lines": [{"quantity": 0}, "oops"]}"#;
    report("shallow view of nested", &validate_payload(nested, &schema));
    report("deep view of nested", &deep.validate_payload(nested, &schema));
}
