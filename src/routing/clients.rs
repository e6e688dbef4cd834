//! Capability client constructors.
//!
//! The [`CapabilityRouter`] turns a resolved provider/model list into a
//! `ProviderChain`. Chain construction is the one place this crate fails
//! loudly: a chain with zero usable adapters signals a broken deployment,
//! not a transient fault, so it is an error rather than a sentinel.

use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::{self, CAP_CRM, CAP_EMAIL, CAP_LLM, CAP_SOCIAL};
use crate::config::PlatformConfig;
use crate::providers::adapter::SharedAdapter;
use crate::providers::chain::ProviderChain;
use crate::providers::wrapper::{ProviderWrapper, WrapperOptions};
use crate::routing::gate::EscalationGate;
use crate::routing::profiles::{self, Profile, ProviderModelConfig};

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Construction-time routing failures. These propagate — an empty chain is a
/// deployment bug.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("No working {0} adapters configured")]
    NoAdapters(&'static str),
}

// ─── Adapter factory seam ─────────────────────────────────────────────────────

/// Builds one adapter per resolved configuration entry.
///
/// The default [`CatalogFactory`] serves the built-in vendor catalog; deploys
/// with live transports inject their own factory here.
pub trait AdapterFactory: Send + Sync {
    /// Build an adapter, or `None` if this factory cannot serve the entry.
    fn build(
        &self,
        capability: &str,
        provider: &str,
        model: Option<&str>,
        dry_run: bool,
    ) -> Option<SharedAdapter>;
}

/// Factory over the built-in vendor catalog.
pub struct CatalogFactory;

impl AdapterFactory for CatalogFactory {
    fn build(
        &self,
        _capability: &str,
        provider: &str,
        model: Option<&str>,
        dry_run: bool,
    ) -> Option<SharedAdapter> {
        adapters::build(provider, model, dry_run)
    }
}

// ─── CapabilityRouter ─────────────────────────────────────────────────────────

/// Materializes provider chains per capability.
pub struct CapabilityRouter {
    config: Arc<PlatformConfig>,
    research_gate: EscalationGate,
    factory: Arc<dyn AdapterFactory>,
}

impl CapabilityRouter {
    pub fn new(config: Arc<PlatformConfig>) -> Self {
        let research_gate = EscalationGate::new(config.deep_research.max_escalations_per_hour);
        Self {
            config,
            research_gate,
            factory: Arc::new(CatalogFactory),
        }
    }

    /// Replace the adapter factory (used by deploys with live transports,
    /// and by tests).
    pub fn with_factory(mut self, factory: Arc<dyn AdapterFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Resolve the profile for a use case.
    ///
    /// Precedence, first match wins: explicit override > environment
    /// override > configured table > built-in defaults.
    pub fn profile_for_use_case(&self, use_case: &str, explicit: Option<Profile>) -> Profile {
        if let Some(profile) = explicit {
            return profile;
        }
        if let Some(profile) = profiles::env_profile_override(use_case) {
            return profile;
        }
        if let Some(profile) = self.config.profile_override(use_case) {
            return profile;
        }
        profiles::default_profile(use_case)
    }

    /// Resolve the ordered provider/model fallback list for a profile.
    ///
    /// `deep_research` appends one research-tier entry only when the feature
    /// flag is on and the escalation gate admits it; a refusal is silent.
    /// `multimodal` is a reserved reordering hint — it never alters the
    /// output when false.
    pub async fn build_provider_config(
        &self,
        profile: Profile,
        use_case: &str,
        deep_research: bool,
        multimodal: bool,
    ) -> Vec<ProviderModelConfig> {
        let mut configs = profiles::provider_configs(profile);

        if deep_research && self.config.deep_research.enabled && self.research_gate.admit().await {
            let entry = profiles::research_escalation_entry();
            // The research profile already carries the escalation model.
            if !configs.contains(&entry) {
                info!(use_case, model = %entry.model, "deep-research escalation admitted");
                configs.push(entry);
            }
        }

        let _ = multimodal; // reserved

        debug!(
            use_case,
            profile = %profile,
            entries = configs.len(),
            "resolved provider config"
        );
        configs
    }

    /// Build the LLM chain for a use case.
    pub async fn llm_client(
        &self,
        use_case: &str,
        explicit: Option<Profile>,
        deep_research: bool,
        multimodal: bool,
    ) -> Result<ProviderChain, RouterError> {
        let profile = self.profile_for_use_case(use_case, explicit);
        let configs = self
            .build_provider_config(profile, use_case, deep_research, multimodal)
            .await;

        let wrappers = self.wrap_entries(
            CAP_LLM,
            configs
                .iter()
                .map(|c| (c.provider.as_str(), Some(c.model.as_str()))),
        );
        if wrappers.is_empty() {
            return Err(RouterError::NoAdapters("LLM"));
        }

        info!(
            use_case,
            profile = %profile,
            providers = wrappers.len(),
            "materialized llm chain"
        );
        Ok(ProviderChain::new(CAP_LLM, wrappers))
    }

    /// Build the email-sending chain.
    pub fn email_client(&self) -> Result<ProviderChain, RouterError> {
        self.capability_chain(CAP_EMAIL, "email")
    }

    /// Build the social-posting chain.
    pub fn social_client(&self) -> Result<ProviderChain, RouterError> {
        self.capability_chain(CAP_SOCIAL, "social")
    }

    /// Build the CRM chain.
    pub fn crm_client(&self) -> Result<ProviderChain, RouterError> {
        self.capability_chain(CAP_CRM, "CRM")
    }

    fn capability_chain(
        &self,
        capability: &'static str,
        label: &'static str,
    ) -> Result<ProviderChain, RouterError> {
        let wrappers = self.wrap_entries(
            capability,
            adapters::providers_for_capability(capability)
                .into_iter()
                .map(|p| (p, None)),
        );
        if wrappers.is_empty() {
            return Err(RouterError::NoAdapters(label));
        }
        Ok(ProviderChain::new(capability, wrappers))
    }

    fn wrap_entries<'a>(
        &self,
        capability: &str,
        entries: impl Iterator<Item = (&'a str, Option<&'a str>)>,
    ) -> Vec<Arc<ProviderWrapper>> {
        let options = self.wrapper_options();
        entries
            .filter_map(|(provider, model)| {
                self.factory
                    .build(capability, provider, model, self.config.dry_run)
                    .map(|adapter| {
                        Arc::new(ProviderWrapper::with_options(adapter, options.clone()))
                    })
            })
            .collect()
    }

    fn wrapper_options(&self) -> WrapperOptions {
        WrapperOptions {
            dry_run: self.config.dry_run,
            attempt_timeout: self.config.attempt_timeout(),
            success_threshold: self.config.health.success_threshold,
            failure_threshold: self.config.health.failure_threshold,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
