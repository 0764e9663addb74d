//! Registers a model from a manifest, validates a batch of webhook payloads and
//! prints the verdict.
//!
//! Run with `RUST_LOG=info cargo run --example batch_demo`.

use anyhow::Context;
use serde_json::json;
use std::sync::Arc;
use validation_gateway::{
    BatchStartRequest, GatewayConfig, ManifestParser, ModelRegistry, ValidationGateway, ValidationRequest,
    ValidationResponse,
};

const MANIFEST: &str = r#"{
    "version": "1.0",
    "models": [
        {
            "name": "deployment",
            "display_name": "Deployment Event",
            "fields": [
                {"name": "service", "type": "string", "rules": {"required": true, "pattern": "^[a-z][a-z0-9-]*$"}},
                {"name": "environment", "type": "string", "rules": {"enum": ["staging", "production"]}},
                {"name": "replicas", "type": "uint8", "rules": {"minimum": 1, "maximum": 50}},
                {"name": "labels", "type": "map", "values": {"type": "string"}}
            ]
        }
    ]
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::try_init();

    let manifest = ManifestParser::from_json(MANIFEST).context("parsing demo manifest")?;
    let registry = Arc::new(ModelRegistry::new());
    registry.register_manifest(&manifest)?;

    let gateway = ValidationGateway::with_registry(registry, GatewayConfig::default())?;
    let batch = gateway.start_batch(BatchStartRequest::new("deployment").with_threshold(75.0))?;
    println!("Started batch {}", batch.batch_id);

    let payloads = [
        json!({"service": "checkout", "environment": "production", "replicas": 6}),
        json!({"service": "search", "environment": "staging", "replicas": 2, "labels": {"team": "discovery"}}),
        json!({"service": "Billing", "environment": "production", "replicas": 3}),
        json!({"service": "mailer", "environment": "staging", "replicas": 400}),
        json!({"service": "ledger", "environment": "production", "replicas": 4}),
    ];

    for payload in payloads {
        let request = ValidationRequest::new("deployment", payload).in_batch(&batch.batch_id);
        match gateway.handle_validation(request) {
            Ok(ValidationResponse::Accumulated(response)) => {
                let issues: Vec<String> = response.result.errors.iter().map(ToString::to_string).collect();
                println!(
                    "  record {:>2}: {} {}",
                    response.total_records,
                    if response.is_valid { "valid  " } else { "invalid" },
                    issues.join("; ")
                );
            }
            Ok(ValidationResponse::Result(result)) => println!("  unbatched result: {:?}", result.is_valid),
            Err(e) => println!("  rejected: {}", e),
        }
    }

    let status = gateway.batch_status(&batch.batch_id)?;
    println!(
        "Batch {}: {}/{} valid ({:.1}%)",
        status.batch_id, status.valid, status.total, status.success_rate
    );

    let verdict = gateway.complete_batch(&batch.batch_id)?;
    println!("Verdict: {}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
