// SPDX-License-Identifier: MIT
//! Active self-check prober.
//!
//! Organic traffic only exercises the providers callers happen to hit; the
//! self-check service probes every wrapped provider of every registered
//! chain on demand or on a timer, so operators see failures before campaigns
//! do. One failing provider never aborts a sweep.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::providers::adapter::Validation;
use crate::providers::chain::ProviderChain;
use crate::providers::wrapper::ProviderWrapper;
use crate::selfcheck::registry::{
    HealthCheckResult, RegistryReport, SharedSelfCheckRegistry,
};
use crate::selfcheck::remediation;

/// Probes registered chains and feeds the registry.
pub struct SelfCheckService {
    registry: SharedSelfCheckRegistry,
    chains: RwLock<Vec<Arc<ProviderChain>>>,
    periodic: Mutex<Option<JoinHandle<()>>>,
}

impl SelfCheckService {
    pub fn new(registry: SharedSelfCheckRegistry) -> Self {
        Self {
            registry,
            chains: RwLock::new(Vec::new()),
            periodic: Mutex::new(None),
        }
    }

    /// The registry this service writes to.
    pub fn registry(&self) -> &SharedSelfCheckRegistry {
        &self.registry
    }

    /// Register a chain for discovery by full checks.
    pub async fn register_chain(&self, chain: Arc<ProviderChain>) {
        debug!(capability = %chain.capability(), "registering chain for self-checks");
        self.chains.write().await.push(chain);
    }

    /// Probe every provider of the given chains (or of all registered chains
    /// when `None`) and return the refreshed registry report.
    pub async fn run_full_check(
        &self,
        chains: Option<Vec<Arc<ProviderChain>>>,
    ) -> RegistryReport {
        let targets = match chains {
            Some(chains) => chains,
            None => self.chains.read().await.clone(),
        };
        let sweep_id = uuid::Uuid::new_v4().to_string();
        info!(sweep_id = %sweep_id, chains = targets.len(), "self-check sweep starting");

        for chain in &targets {
            for wrapper in chain.providers() {
                self.probe_wrapper(chain.capability(), wrapper, &sweep_id)
                    .await;
            }
        }

        self.registry.status_report().await
    }

    /// Probe one wrapped provider and record the outcome.
    ///
    /// The probe is the one the adapter declares; an adapter with no probe is
    /// assumed healthy without any call. Probe faults are captured, never
    /// propagated — the sweep always continues.
    async fn probe_wrapper(&self, capability: &str, wrapper: &ProviderWrapper, sweep_id: &str) {
        let adapter = wrapper.adapter();
        let start = Instant::now();

        let (success, error) = match adapter.validation() {
            Validation::Credentials => match adapter.validate_credentials().await {
                Ok(true) => (true, None),
                Ok(false) => (false, Some("credential validation failed".to_string())),
                Err(e) => (false, Some(e.status_message())),
            },
            Validation::Connection => match adapter.validate_connection().await {
                Ok(true) => (true, None),
                Ok(false) => (false, Some("connection validation failed".to_string())),
                Err(e) => (false, Some(e.status_message())),
            },
            Validation::Configured => {
                if adapter.is_configured().await {
                    (true, None)
                } else {
                    (false, Some("adapter is not configured".to_string()))
                }
            }
            Validation::None => (true, None),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        let mut result = if success {
            HealthCheckResult::ok(wrapper.name(), capability)
        } else {
            HealthCheckResult::failed(
                wrapper.name(),
                capability,
                error.clone().unwrap_or_default(),
            )
        };
        result.latency_ms = Some(latency_ms);
        result
            .metadata
            .insert("sweep_id".to_string(), Value::from(sweep_id));
        self.registry.record_health_check(result).await;

        if !success {
            warn!(
                provider = %wrapper.name(),
                capability,
                error = error.as_deref().unwrap_or(""),
                "self-check probe failed"
            );
            let status = wrapper.status().await;
            let recommendation =
                remediation::recommendation_for(wrapper.name(), status.health, error.as_deref());
            self.registry.record_recommendation(recommendation).await;
        }
    }

    /// Run full checks on a timer. A sweep runs immediately, then every
    /// `interval`. Calling this again restarts the loop with the new
    /// interval.
    pub async fn start_periodic_checks(self: &Arc<Self>, interval: Duration) {
        let mut guard = self.periodic.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        info!(interval_secs = interval.as_secs(), "starting periodic self-checks");
        let service = Arc::clone(self);
        *guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let report = service.run_full_check(None).await;
                debug!(
                    total_checks = report.total_checks,
                    success_rate = report.success_rate,
                    "periodic self-check sweep complete"
                );
            }
        }));
    }

    /// Cancel the periodic loop. Safe to call when none is running.
    pub async fn stop_periodic_checks(&self) {
        let mut guard = self.periodic.lock().await;
        match guard.take() {
            Some(handle) => {
                handle.abort();
                info!("periodic self-checks stopped");
            }
            None => debug!("stop requested with no periodic loop running"),
        }
    }
}

/// Shared service handle.
pub type SharedSelfCheckService = Arc<SelfCheckService>;

// ─── Tests ────────────────────────────────────────────────────────────────────
