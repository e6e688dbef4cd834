//! Vendor adapter catalog.
//!
//! One thin [`VendorAdapter`] per supported external provider, grouped by
//! capability:
//!
//! | capability | providers |
//! |------------|-----------|
//! | `llm` | openai, anthropic, google |
//! | `email_sending` | sendgrid, ses |
//! | `social_posting` | linkedin, twitter |
//! | `crm` | hubspot, salesforce |
//!
//! These adapters carry each vendor's operation surface, credential
//! environment key, and validation probe. They simulate calls in dry-run
//! mode; live wire transports plug in behind the same [`ProviderAdapter`]
//! contract via a custom `AdapterFactory` on the router.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::providers::adapter::{AdapterError, ProviderAdapter, SharedAdapter, Validation};

// ─── Capability keys ──────────────────────────────────────────────────────────

pub const CAP_LLM: &str = "llm";
pub const CAP_EMAIL: &str = "email_sending";
pub const CAP_SOCIAL: &str = "social_posting";
pub const CAP_CRM: &str = "crm";

// ─── VendorAdapter ────────────────────────────────────────────────────────────

/// A thin, dry-run-capable adapter for one vendor.
pub struct VendorAdapter {
    name: &'static str,
    capability: &'static str,
    operations: &'static [&'static str],
    validation: Validation,
    /// Environment variable holding this vendor's credential.
    credential_env: &'static str,
    /// Model identifier, for LLM vendors.
    model: Option<String>,
    dry_run: bool,
}

impl VendorAdapter {
    fn credential_present(&self) -> bool {
        std::env::var(self.credential_env)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }

    /// Model this adapter was resolved with, if any.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

#[async_trait]
impl ProviderAdapter for VendorAdapter {
    fn name(&self) -> &str {
        self.name
    }

    fn capability(&self) -> &str {
        self.capability
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }

    async fn invoke(&self, operation: &str, params: Value) -> Result<Value, AdapterError> {
        if !self.operations.contains(&operation) {
            return Err(AdapterError::UnsupportedOperation(operation.to_string()));
        }
        if self.dry_run {
            return Ok(json!({
                "provider": self.name,
                "operation": operation,
                "model": self.model,
                "simulated": true,
                "params": params,
            }));
        }
        if !self.credential_present() {
            return Err(AdapterError::NotConfigured(format!(
                "{} is not set",
                self.credential_env
            )));
        }
        // The live transport is vendor-specific and plugs in behind this same
        // contract; the catalog adapter itself never speaks to the network.
        Err(AdapterError::NotConfigured(format!(
            "no live transport wired for provider `{}`",
            self.name
        )))
    }

    fn validation(&self) -> Validation {
        self.validation
    }

    async fn validate_credentials(&self) -> Result<bool, AdapterError> {
        Ok(self.dry_run || self.credential_present())
    }

    async fn validate_connection(&self) -> Result<bool, AdapterError> {
        Ok(self.dry_run || self.credential_present())
    }

    async fn is_configured(&self) -> bool {
        self.dry_run || self.credential_present()
    }
}

impl std::fmt::Debug for VendorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorAdapter")
            .field("name", &self.name)
            .field("capability", &self.capability)
            .field("model", &self.model)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

struct VendorSpec {
    name: &'static str,
    capability: &'static str,
    operations: &'static [&'static str],
    validation: Validation,
    credential_env: &'static str,
}

const LLM_OPS: &[&str] = &["generate", "classify", "embed"];
const EMAIL_OPS: &[&str] = &["send_email", "send_batch"];
const SOCIAL_OPS: &[&str] = &["create_post", "schedule_post"];
const CRM_OPS: &[&str] = &["sync_contact", "create_deal", "log_activity"];

/// Everything the platform knows how to talk to.
const CATALOG: &[VendorSpec] = &[
    VendorSpec {
        name: "openai",
        capability: CAP_LLM,
        operations: LLM_OPS,
        validation: Validation::Credentials,
        credential_env: "OPENAI_API_KEY",
    },
    VendorSpec {
        name: "anthropic",
        capability: CAP_LLM,
        operations: LLM_OPS,
        validation: Validation::Credentials,
        credential_env: "ANTHROPIC_API_KEY",
    },
    VendorSpec {
        name: "google",
        capability: CAP_LLM,
        operations: LLM_OPS,
        validation: Validation::Credentials,
        credential_env: "GOOGLE_API_KEY",
    },
    VendorSpec {
        name: "sendgrid",
        capability: CAP_EMAIL,
        operations: EMAIL_OPS,
        validation: Validation::Credentials,
        credential_env: "SENDGRID_API_KEY",
    },
    VendorSpec {
        name: "ses",
        capability: CAP_EMAIL,
        operations: EMAIL_OPS,
        validation: Validation::Connection,
        credential_env: "AWS_ACCESS_KEY_ID",
    },
    VendorSpec {
        name: "linkedin",
        capability: CAP_SOCIAL,
        operations: SOCIAL_OPS,
        validation: Validation::Credentials,
        credential_env: "LINKEDIN_ACCESS_TOKEN",
    },
    VendorSpec {
        name: "twitter",
        capability: CAP_SOCIAL,
        operations: SOCIAL_OPS,
        validation: Validation::Credentials,
        credential_env: "TWITTER_BEARER_TOKEN",
    },
    VendorSpec {
        name: "hubspot",
        capability: CAP_CRM,
        operations: CRM_OPS,
        validation: Validation::Credentials,
        credential_env: "HUBSPOT_API_KEY",
    },
    VendorSpec {
        name: "salesforce",
        capability: CAP_CRM,
        operations: CRM_OPS,
        validation: Validation::Configured,
        credential_env: "SALESFORCE_CLIENT_SECRET",
    },
];

/// Build a catalog adapter for `provider`, or `None` if the platform does
/// not know the vendor. `model` is carried through for LLM vendors.
pub fn build(provider: &str, model: Option<&str>, dry_run: bool) -> Option<SharedAdapter> {
    let spec = CATALOG.iter().find(|s| s.name == provider)?;
    Some(std::sync::Arc::new(VendorAdapter {
        name: spec.name,
        capability: spec.capability,
        operations: spec.operations,
        validation: spec.validation,
        credential_env: spec.credential_env,
        model: model.map(str::to_string),
        dry_run,
    }))
}

/// Provider names known for a capability, in default fallback order.
pub fn providers_for_capability(capability: &str) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|s| s.capability == capability)
        .map(|s| s.name)
        .collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_invoke_is_simulated() {
        let adapter = build("openai", Some("gpt-5.3"), true).unwrap();
        let out = adapter
            .invoke("generate", json!({ "prompt": "hi" }))
            .await
            .unwrap();
        assert_eq!(out["simulated"], true);
        assert_eq!(out["provider"], "openai");
        assert_eq!(out["model"], "gpt-5.3");
    }

    #[tokio::test]
    async fn unknown_operation_is_typed() {
        let adapter = build("hubspot", None, true).unwrap();
        let err = adapter.invoke("generate", json!({})).await.unwrap_err();
        assert_eq!(err.kind(), "UnsupportedOperation");
    }

    #[test]
    fn unknown_provider_is_none() {
        assert!(build("faxmachine", None, true).is_none());
    }

    #[test]
    fn capability_listing_is_ordered() {
        assert_eq!(
            providers_for_capability(CAP_EMAIL),
            vec!["sendgrid", "ses"]
        );
        assert_eq!(
            providers_for_capability(CAP_LLM),
            vec!["openai", "anthropic", "google"]
        );
    }

    #[tokio::test]
    async fn dry_run_probes_pass() {
        let adapter = build("salesforce", None, true).unwrap();
        assert_eq!(adapter.validation(), Validation::Configured);
        assert!(adapter.is_configured().await);
    }
}
