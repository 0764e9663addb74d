use serde_json::json;
use std::sync::Arc;
use validation_gateway::*;

use test_utils::*;

#[test]
fn test_repeated_get_returns_same_schema() {
    init_logging();
    let registry = create_test_registry();

    let first = registry.get("ticket").unwrap();
    let second = registry.get("ticket").unwrap();

    assert!(Arc::ptr_eq(first.schema(), second.schema()));
    assert_eq!(**first.schema(), Ticket::schema());
}

#[test]
fn test_reregistering_identical_schema_is_idempotent() {
    let registry = create_test_registry();
    let original = registry.get("ticket").unwrap();

    let again = registry
        .register_model::<Ticket, _>("ticket", |_: &Ticket| ValidationResult::new(), ModelMetadata::new("Other", "9.9"))
        .unwrap();

    assert!(Arc::ptr_eq(&original, &again));
    assert_eq!(registry.len(), 1);
    assert_eq!(again.metadata().display_name, "Ticket");
}

#[test]
fn test_conflicting_schema_leaves_first_registration_intact() {
    let registry = create_test_registry();
    let conflicting = TypeSchema::new("Ticket").with_field("ID", FieldKind::Int(IntWidth::W32));
    let validator = Arc::new(RuleValidator::new("ticket"));

    let err = registry
        .register("ticket", conflicting, validator, ModelMetadata::default())
        .unwrap_err();
    assert_eq!(err, RegistryError::DuplicateName("ticket".to_string()));

    let kept = registry.get("ticket").unwrap();
    assert_eq!(**kept.schema(), Ticket::schema());
    assert_eq!(GatewayError::from(err).code(), GatewayErrorCode::Conflict);
}

#[test]
fn test_instances_are_independent() {
    let registry = create_test_registry();

    let populated = registry.convert("ticket", &json!({"id": "T1", "value": 42, "active": true})).unwrap();
    let fresh = registry.create_instance("ticket").unwrap();

    assert_eq!(populated.get_str("ID"), Some("T1"));
    assert_eq!(fresh.get_str("ID"), Some(""));
    assert_eq!(fresh.get_i64("Value"), Some(0));
    assert_eq!(fresh.get_bool("Active"), Some(false));
}

#[test]
fn test_typed_validator_runs_over_converted_model() {
    let registry = create_test_registry();
    let validator = registry.get_validator("ticket").unwrap();

    let good = registry.convert("ticket", &valid_ticket(7)).unwrap();
    assert!(validator.validate(&good).is_valid);

    let bad = registry.convert("ticket", &invalid_ticket(7)).unwrap();
    let result = validator.validate(&bad);
    assert!(!result.is_valid);
    assert_eq!(result.errors[0].field, "Value");

    let inactive = registry.convert("ticket", &json!({"id": "T2", "value": 1})).unwrap();
    let result = validator.validate(&inactive);
    assert!(result.is_valid);
    assert_eq!(result.warning_count(), 1);
}

#[test]
fn test_unknown_model_type() {
    let registry = create_test_registry();

    assert!(!registry.is_registered("invoice"));
    assert_eq!(registry.get("invoice").unwrap_err(), RegistryError::NotFound("invoice".to_string()));
    assert!(registry.convert("invoice", &json!({})).unwrap_err().is_not_found());
}

#[test]
fn test_model_summary_serializes() {
    let registry = create_test_registry();
    let summary = registry.get("ticket").unwrap().summary();
    let value = serde_json::to_value(&summary).unwrap();

    assert_eq!(value["name"], "ticket");
    assert_eq!(value["display_name"], "Ticket");
    assert_eq!(value["validator"], "ticket");
    assert!(value.get("description").is_none());
}

#[test]
fn test_register_manifest() {
    init_logging();
    let registry = ModelRegistry::new();
    let manifest = ManifestParser::from_json(TEST_MANIFEST_JSON).unwrap();

    let registered = registry.register_manifest(&manifest).unwrap();
    assert_eq!(registered.len(), 2);
    assert_eq!(registry.names(), vec!["pull_request".to_string(), "heartbeat".to_string()]);

    let descriptor = registry.get("pull_request").unwrap();
    assert_eq!(descriptor.metadata().version, "2.1.0");
    assert_eq!(descriptor.metadata().tags, vec!["webhook".to_string(), "scm".to_string()]);

    // Registering the same manifest again is a no-op
    registry.register_manifest(&manifest).unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_concurrent_reads_during_registration() {
    let registry = create_test_registry();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let registry = &registry;
            scope.spawn(move || {
                let name = format!("model_{}", i);
                registry
                    .register(&name, TypeSchema::new(name.as_str()), Arc::new(RuleValidator::new(name.as_str())), ModelMetadata::default())
                    .unwrap();
                for _ in 0..100 {
                    assert!(registry.get("ticket").is_ok());
                }
            });
        }
    });

    assert_eq!(registry.len(), 9);
}
