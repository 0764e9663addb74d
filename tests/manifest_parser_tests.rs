use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use validation_gateway::*;

use test_utils::*;

#[test]
fn test_parse_manifest_models() {
    init_logging();
    let manifest = ManifestParser::from_json(TEST_MANIFEST_JSON).unwrap();

    assert_eq!(manifest.version, "1.0.0");
    assert_eq!(manifest.models.len(), 2);

    let pull_request = manifest.get_model("pull_request").unwrap();
    let schema = pull_request.to_schema().unwrap();
    assert_eq!(schema.len(), 5);
    assert_eq!(
        schema.get_field("number").unwrap().kind,
        FieldKind::UInt(IntWidth::W32)
    );
}

#[test]
fn test_manifest_rules_drive_validation() {
    let registry = ModelRegistry::new();
    registry
        .register_manifest(&ManifestParser::from_json(TEST_MANIFEST_JSON).unwrap())
        .unwrap();
    let gateway = ValidationGateway::with_registry(std::sync::Arc::new(registry), GatewayConfig::testing()).unwrap();

    let ok = gateway
        .validate(
            "pull_request",
            &json!({"action": "opened", "number": 7, "title": "Add retries", "sender": {"login": "octo"}}),
        )
        .unwrap();
    assert!(ok.is_valid, "{:?}", ok.errors);
    assert!(ok.warnings.is_empty());

    let draft = gateway
        .validate(
            "pull_request",
            &json!({"action": "opened", "number": 8, "title": "WIP: retries", "sender": {"login": "octo"}}),
        )
        .unwrap();
    assert!(draft.is_valid);
    assert_eq!(draft.warnings.len(), 1);

    let bad = gateway
        .validate("pull_request", &json!({"action": "merged", "number": 0}))
        .unwrap();
    assert!(!bad.is_valid);
    let fields: Vec<&str> = bad.errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"action"));
    assert!(fields.contains(&"number"));
    assert!(fields.contains(&"sender.login"));
}

#[test]
fn test_timestamp_fields_from_manifest() {
    let registry = ModelRegistry::new();
    registry
        .register_manifest(&ManifestParser::from_json(TEST_MANIFEST_JSON).unwrap())
        .unwrap();

    let record = registry
        .convert("heartbeat", &json!({"service": "api", "sent_at": "2024-05-01T08:30:00+02:00"}))
        .unwrap();
    let sent_at = record.get("sent_at").and_then(FieldValue::as_timestamp).unwrap();
    assert_eq!(sent_at.to_rfc3339(), "2024-05-01T06:30:00+00:00");
}

#[test]
fn test_malformed_manifest_registers_nothing() {
    let json = r#"{
        "version": "1.0",
        "models": [
            {"name": "first", "fields": [{"name": "a", "type": "string"}]},
            {"name": "second", "fields": [{"name": "b", "type": "array"}]}
        ]
    }"#;

    let err = ManifestParser::from_json(json).unwrap_err();
    assert!(matches!(err, ManifestError::MissingElementType { .. }));

    let manifest: Manifest = serde_json::from_str(json).unwrap();
    let registry = ModelRegistry::new();
    assert!(registry.register_manifest(&manifest).is_err());
    assert!(registry.is_empty());
}

#[test]
fn test_duplicate_model_in_manifest_registers_nothing() {
    let json = r#"{
        "version": "1.0",
        "models": [
            {"name": "ok1", "fields": [{"name": "a", "type": "string"}]},
            {"name": "dup", "fields": [{"name": "a", "type": "string"}]},
            {"name": "dup", "fields": [{"name": "a", "type": "int32"}]}
        ]
    }"#;

    let err = ManifestParser::from_json(json).unwrap_err();
    assert!(matches!(err, ManifestError::DuplicateModel(ref name) if name == "dup"));

    let manifest: Manifest = serde_json::from_str(json).unwrap();
    let registry = ModelRegistry::new();
    let err = registry.register_manifest(&manifest).unwrap_err();
    assert_eq!(err.code(), GatewayErrorCode::InvalidInput);
    assert!(registry.is_empty());
}

#[test]
fn test_manifest_conflicting_with_registry_registers_nothing() {
    let registry = ModelRegistry::new();
    registry
        .register(
            "dup",
            TypeSchema::new("dup").with_field("a", FieldKind::Int(IntWidth::W32)),
            Arc::new(RuleValidator::new("dup")),
            ModelMetadata::default(),
        )
        .unwrap();

    let manifest = ManifestParser::from_json(
        r#"{
            "version": "1.0",
            "models": [
                {"name": "ok1", "fields": [{"name": "a", "type": "string"}]},
                {"name": "dup", "fields": [{"name": "a", "type": "string"}]}
            ]
        }"#,
    )
    .unwrap();

    let err = registry.register_manifest(&manifest).unwrap_err();
    assert_eq!(err.code(), GatewayErrorCode::Conflict);
    assert_eq!(registry.names(), vec!["dup".to_string()]);
    assert!(!registry.is_registered("ok1"));
}

#[test]
fn test_parse_errors_carry_context() {
    let err = ManifestParser::from_json_with_context(r#"{"version": 1}"#, Some("models.json")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("models.json"), "{}", message);
    assert!(matches!(err, ManifestError::Parse { .. }));
}

#[tokio::test]
async fn test_from_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(TEST_MANIFEST_JSON.as_bytes()).unwrap();

    let manifest = ManifestParser::from_file(file.path()).await.unwrap();
    assert_eq!(manifest.models.len(), 2);
}

#[tokio::test]
async fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ManifestParser::from_file(dir.path().join("absent.json")).await.unwrap_err();

    assert!(matches!(err, ManifestError::Io { .. }));
    assert_eq!(GatewayError::from(err).code(), GatewayErrorCode::InvalidInput);
}

#[cfg(feature = "yaml-support")]
#[tokio::test]
async fn test_from_yaml_file() {
    let yaml = "version: \"1.0\"\nmodels:\n  - name: ping\n    fields:\n      - name: host\n        type: string\n";
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let manifest = ManifestParser::from_file(file.path()).await.unwrap();
    assert_eq!(manifest.get_model("ping").unwrap().fields.len(), 1);
}
