//! End-to-end self-check behavior over a real `Switchboard`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use switchboard::config::PlatformConfig;
use switchboard::providers::adapter::{AdapterError, ProviderAdapter, SharedAdapter, Validation};
use switchboard::routing::clients::AdapterFactory;
use switchboard::selfcheck::registry::{HealthCheckResult, Severity};
use switchboard::Switchboard;

// ─── A factory whose adapters fail their credential probes ────────────────────

struct BrokenCredsAdapter {
    name: String,
    capability: String,
}

#[async_trait]
impl ProviderAdapter for BrokenCredsAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> &str {
        &self.capability
    }

    async fn invoke(&self, _: &str, _: Value) -> Result<Value, AdapterError> {
        Err(AdapterError::NotConfigured("no key".to_string()))
    }

    fn validation(&self) -> Validation {
        Validation::Credentials
    }

    async fn validate_credentials(&self) -> Result<bool, AdapterError> {
        Err(AdapterError::NotConfigured(format!(
            "{} has no credentials",
            self.name
        )))
    }
}

struct BrokenFactory;

impl AdapterFactory for BrokenFactory {
    fn build(
        &self,
        capability: &str,
        provider: &str,
        _model: Option<&str>,
        _dry_run: bool,
    ) -> Option<SharedAdapter> {
        Some(Arc::new(BrokenCredsAdapter {
            name: provider.to_string(),
            capability: capability.to_string(),
        }))
    }
}

// ─── Sweeps ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dry_run_catalog_sweep_is_all_green() {
    let sb = Switchboard::new(PlatformConfig::default());
    sb.llm_client("content_generation", None, false, false)
        .await
        .unwrap();
    sb.email_client().await.unwrap();
    sb.social_client().await.unwrap();
    sb.crm_client().await.unwrap();

    let report = sb.self_check().run_full_check(None).await;
    // 3 llm + 2 email + 2 social + 2 crm providers.
    assert_eq!(report.total_checks, 9);
    assert_eq!(report.success_rate, 1.0);
    assert!(report.recommendations.is_empty());
    assert_eq!(report.latest_checks.len(), 5);
}

#[tokio::test]
async fn failing_providers_get_recommendations_without_aborting() {
    let sb = Switchboard::with_factory(PlatformConfig::default(), Arc::new(BrokenFactory));
    sb.llm_client("content_generation", None, false, false)
        .await
        .unwrap();

    let report = sb.self_check().run_full_check(None).await;
    assert_eq!(report.total_checks, 3);
    assert_eq!(report.success_rate, 0.0);
    // One recommendation per provider, from the provider-keyed table.
    assert_eq!(report.recommendations.len(), 3);
    let openai = report
        .recommendations
        .iter()
        .find(|r| r.provider_name == "openai")
        .unwrap();
    assert_eq!(openai.severity, Severity::High);
    assert!(openai.suggested_action.contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn repeated_failures_keep_one_recommendation_per_provider() {
    let sb = Switchboard::with_factory(PlatformConfig::default(), Arc::new(BrokenFactory));
    sb.llm_client("content_generation", None, false, false)
        .await
        .unwrap();

    sb.self_check().run_full_check(None).await;
    sb.self_check().run_full_check(None).await;
    let report = sb.self_check().run_full_check(None).await;

    // History accumulates…
    assert_eq!(report.total_checks, 9);
    // …but recommendations replace, never append.
    assert_eq!(report.recommendations.len(), 3);
}

#[tokio::test]
async fn history_is_most_recent_first_and_filterable() {
    let sb = Switchboard::new(PlatformConfig::default());
    let chain = sb.email_client().await.unwrap();
    chain.invoke("send_email", json!({})).await;

    sb.self_check().run_full_check(None).await;
    sb.self_check().run_full_check(None).await;

    let history = sb
        .registry()
        .get_health_history("sendgrid", Some("email_sending"), None)
        .await;
    assert_eq!(history.len(), 2);
    assert!(history[0].timestamp >= history[1].timestamp);

    // Narrowing to a capability the provider does not serve yields nothing.
    let none = sb
        .registry()
        .get_health_history("sendgrid", Some("crm"), None)
        .await;
    assert!(none.is_empty());
}

// ─── Periodic loop ────────────────────────────────────────────────────────────

#[tokio::test]
async fn periodic_checks_run_and_stop_idempotently() {
    let sb = Switchboard::new(PlatformConfig::default());
    sb.crm_client().await.unwrap();

    sb.start_periodic_checks(Duration::from_millis(10)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    sb.stop_periodic_checks().await;

    let total = sb.registry().status_report().await.total_checks;
    assert!(total >= 2, "expected several sweeps, got {total}");

    // Stopping again is a no-op, and no further sweeps run.
    sb.stop_periodic_checks().await;
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(sb.registry().status_report().await.total_checks, total);
}

// ─── Serialization ────────────────────────────────────────────────────────────

#[test]
fn health_check_result_round_trip_preserves_identity() {
    let original = HealthCheckResult::ok("anthropic", "llm");
    let encoded = serde_json::to_string(&original).unwrap();
    let decoded: HealthCheckResult = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded.provider_name, "anthropic");
    assert_eq!(decoded.capability, "llm");
    assert!(decoded.success);
    assert_eq!(decoded.timestamp, original.timestamp);
}
