use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use validation_gateway::*;

use test_utils::*;

fn deployment_schema() -> Arc<TypeSchema> {
    let owner = TypeSchema::new("Owner")
        .with_field("team", FieldKind::String)
        .with_field("oncall", FieldKind::sequence_of(FieldKind::String));

    TypeSchema::new("Deployment")
        .with_field("service", FieldKind::String)
        .with_field("replicas", FieldKind::Int(IntWidth::W8))
        .with_field("ports", FieldKind::sequence_of(FieldKind::UInt(IntWidth::W16)))
        .with_field("limits", FieldKind::mapping_of(FieldKind::String, FieldKind::Float(FloatWidth::W64)))
        .with_field("weights", FieldKind::mapping_of(FieldKind::UInt(IntWidth::W8), FieldKind::Bool))
        .with_field("owner", FieldKind::struct_of(owner))
        .with_field("deployed_at", FieldKind::Timestamp)
        .with_field("annotations", FieldKind::Json)
        .field(FieldSchema::new("secret", FieldKind::String).with_tag("-"))
        .field(FieldSchema::new("internal", FieldKind::String).private())
        .into_shared()
}

#[test]
fn test_ticket_payload_converts_exactly() {
    init_logging();
    let registry = create_test_registry();
    let record = registry.convert("ticket", &json!({"id": "T1", "value": 42, "active": true})).unwrap();

    let ticket = Ticket::from_record(&record).unwrap();
    assert_eq!(
        ticket,
        Ticket {
            id: "T1".to_string(),
            value: 42,
            active: true
        }
    );
}

#[test]
fn test_string_into_integer_is_conversion_error() {
    let registry = create_test_registry();
    let err = registry.convert("ticket", &json!({"value": "not-a-number"})).unwrap_err();

    match err {
        GatewayError::Conversion(ConversionError::TypeMismatch { path, expected, actual }) => {
            assert_eq!(path, "value");
            assert_eq!(expected, "int64");
            assert_eq!(actual, "string");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_overflow_into_int8() {
    let err = Converter::convert(&deployment_schema(), &json!({"replicas": 1000})).unwrap_err();
    assert_eq!(
        err,
        ConversionError::Overflow {
            path: "replicas".to_string(),
            value: "1000".to_string(),
            target: "int8".to_string(),
        }
    );

    let err = Converter::convert(&deployment_schema(), &json!({"replicas": 2.5})).unwrap_err();
    assert!(matches!(err, ConversionError::TypeMismatch { .. }));
}

#[test]
fn test_nested_payload() {
    let payload = json!({
        "service": "checkout",
        "replicas": 3,
        "ports": [80, 443],
        "limits": {"cpu": 1.5, "memory": 512},
        "weights": {"1": true, "2": false},
        "owner": {"team": "payments", "oncall": ["ana", "li"]},
        "deployed_at": "2024-03-01T12:00:00Z",
        "annotations": {"free": ["form"]},
        "secret": "hunter2",
        "internal": "x"
    });

    let record = Converter::convert(&deployment_schema(), &payload).unwrap();

    assert_eq!(record.get_i64("replicas"), Some(3));
    assert_eq!(record.extract::<Vec<u16>>("ports").unwrap(), vec![80, 443]);
    assert_eq!(record.lookup("owner.team").and_then(FieldValue::as_str), Some("payments"));

    let limits = record.get("limits").and_then(FieldValue::as_mapping).unwrap();
    assert_eq!(limits.get(&MapKey::String("memory".to_string())).and_then(FieldValue::as_f64), Some(512.0));

    let weights = record.get("weights").and_then(FieldValue::as_mapping).unwrap();
    assert_eq!(weights.get(&MapKey::UInt(1)).and_then(FieldValue::as_bool), Some(true));

    assert_eq!(
        record.get("deployed_at").and_then(FieldValue::as_timestamp),
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    );
    assert_eq!(record.extract::<serde_json::Value>("annotations").unwrap(), json!({"free": ["form"]}));

    // Ignored and private fields are never written
    assert_eq!(record.get_str("secret"), Some(""));
    assert_eq!(record.get_str("internal"), Some(""));
}

#[test]
fn test_error_paths_locate_the_offending_value() {
    let schema = deployment_schema();

    let err = Converter::convert(&schema, &json!({"ports": [80, 443, 70000]})).unwrap_err();
    assert_eq!(err.path(), Some("ports[2]"));

    let err = Converter::convert(&schema, &json!({"limits": {"cpu": "lots"}})).unwrap_err();
    assert_eq!(err.path(), Some("limits[\"cpu\"]"));

    let err = Converter::convert(&schema, &json!({"weights": {"300": true}})).unwrap_err();
    assert!(matches!(err, ConversionError::Overflow { .. } | ConversionError::InvalidKey { .. }));

    let err = Converter::convert(&schema, &json!({"owner": {"oncall": ["ana", {"name": "li"}]}})).unwrap_err();
    assert_eq!(err.path(), Some("owner.oncall[1]"));

    let err = Converter::convert(&schema, &json!({"deployed_at": "yesterday"})).unwrap_err();
    assert!(matches!(err, ConversionError::Reencode { ref path, .. } if path == "deployed_at"));
}

#[test]
fn test_map_keys_that_parse_to_the_same_value_are_rejected() {
    let schema = deployment_schema();

    let err = Converter::convert(&schema, &json!({"weights": {"01": true, "1": false}})).unwrap_err();
    match err {
        ConversionError::InvalidKey { path, expected, .. } => {
            assert!(path.starts_with("weights["), "{}", path);
            assert!(expected.starts_with("unique"), "{}", expected);
        }
        other => panic!("expected InvalidKey, got {:?}", other),
    }

    let record = Converter::convert(&schema, &json!({"weights": {"1": true, "2": false}})).unwrap();
    assert_eq!(record.get("weights").and_then(FieldValue::as_mapping).map(|m| m.len()), Some(2));
}

#[test]
fn test_populate_requires_struct_destination() {
    let mut target = FieldValue::Int(0);
    let err = Converter::populate(&mut target, &json!({"id": "T1"})).unwrap_err();
    assert_eq!(err, ConversionError::InvalidDestination("int".to_string()));

    let registry = create_test_registry();
    let mut target = FieldValue::Struct(registry.create_instance("ticket").unwrap());
    Converter::populate(&mut target, &json!({"id": "T9"})).unwrap();
    assert_eq!(target.as_record().and_then(|r| r.get_str("ID")), Some("T9"));
}

#[test]
fn test_record_to_json_uses_external_keys() {
    let registry = create_test_registry();
    let record = registry.convert("ticket", &json!({"id": "T1", "value": 5})).unwrap();

    assert_eq!(record.to_json(), json!({"id": "T1", "value": 5, "active": false}));
}
