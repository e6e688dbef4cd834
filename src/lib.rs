pub mod adapters;
pub mod config;
pub mod providers;
pub mod routing;
pub mod selfcheck;

use std::sync::Arc;
use std::time::Duration;

use config::PlatformConfig;
use providers::chain::ProviderChain;
use routing::clients::{AdapterFactory, CapabilityRouter, RouterError};
use routing::profiles::Profile;
use selfcheck::registry::{SelfCheckRegistry, SharedSelfCheckRegistry};
use selfcheck::service::{SelfCheckService, SharedSelfCheckService};

/// The resilience layer's root context.
///
/// Built once at process start and passed to consumers — chains, the
/// registry, and the self-check service all hang off this struct. Nothing in
/// the crate is process-global, so tests (and multi-tenant hosts) construct
/// as many independent instances as they need.
pub struct Switchboard {
    pub config: Arc<PlatformConfig>,
    router: Arc<CapabilityRouter>,
    registry: SharedSelfCheckRegistry,
    self_check: SharedSelfCheckService,
}

impl Switchboard {
    /// Wire up the context from a configuration.
    pub fn new(config: PlatformConfig) -> Self {
        let config = Arc::new(config);
        let router = Arc::new(CapabilityRouter::new(Arc::clone(&config)));
        let registry: SharedSelfCheckRegistry = Arc::new(SelfCheckRegistry::new());
        let self_check = Arc::new(SelfCheckService::new(Arc::clone(&registry)));
        Self {
            config,
            router,
            registry,
            self_check,
        }
    }

    /// Wire up with a custom adapter factory (live transports, tests).
    pub fn with_factory(config: PlatformConfig, factory: Arc<dyn AdapterFactory>) -> Self {
        let config = Arc::new(config);
        let router = Arc::new(
            CapabilityRouter::new(Arc::clone(&config)).with_factory(factory),
        );
        let registry: SharedSelfCheckRegistry = Arc::new(SelfCheckRegistry::new());
        let self_check = Arc::new(SelfCheckService::new(Arc::clone(&registry)));
        Self {
            config,
            router,
            registry,
            self_check,
        }
    }

    /// The monitoring registry, for dashboards and CLIs.
    pub fn registry(&self) -> SharedSelfCheckRegistry {
        Arc::clone(&self.registry)
    }

    /// The self-check service.
    pub fn self_check(&self) -> SharedSelfCheckService {
        Arc::clone(&self.self_check)
    }

    /// The profile/use-case router.
    pub fn router(&self) -> &CapabilityRouter {
        &self.router
    }

    /// Build the LLM chain for a use case and register it for self-checks.
    pub async fn llm_client(
        &self,
        use_case: &str,
        profile_override: Option<Profile>,
        deep_research: bool,
        multimodal: bool,
    ) -> Result<Arc<ProviderChain>, RouterError> {
        let chain = self
            .router
            .llm_client(use_case, profile_override, deep_research, multimodal)
            .await?;
        Ok(self.register(chain).await)
    }

    /// Build the email-sending chain and register it for self-checks.
    pub async fn email_client(&self) -> Result<Arc<ProviderChain>, RouterError> {
        Ok(self.register(self.router.email_client()?).await)
    }

    /// Build the social-posting chain and register it for self-checks.
    pub async fn social_client(&self) -> Result<Arc<ProviderChain>, RouterError> {
        Ok(self.register(self.router.social_client()?).await)
    }

    /// Build the CRM chain and register it for self-checks.
    pub async fn crm_client(&self) -> Result<Arc<ProviderChain>, RouterError> {
        Ok(self.register(self.router.crm_client()?).await)
    }

    /// Start periodic self-checks over every registered chain.
    pub async fn start_periodic_checks(&self, interval: Duration) {
        self.self_check.start_periodic_checks(interval).await;
    }

    /// Stop periodic self-checks. Idempotent.
    pub async fn stop_periodic_checks(&self) {
        self.self_check.stop_periodic_checks().await;
    }

    async fn register(&self, chain: ProviderChain) -> Arc<ProviderChain> {
        let chain = Arc::new(chain);
        self.self_check.register_chain(Arc::clone(&chain)).await;
        chain
    }
}
