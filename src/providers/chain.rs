// SPDX-License-Identifier: MIT
//! Health-prioritized sequential fallback across providers.
//!
//! A `ProviderChain` owns the ordered wrapper list for one capability. Each
//! `invoke` sorts a *derived copy* of that list by observed health — the
//! stored order is never mutated — and walks it sequentially until the first
//! success. Exhaustion and the zero-provider case are sentinel return codes,
//! never errors: operators learn about systemic failures through the
//! self-check registry, not through crashes in business logic.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::providers::status::{ProviderHealth, ProviderStatus};
use crate::providers::wrapper::ProviderWrapper;

/// Sentinel `source` code returned by a chain with no providers.
pub const NO_PROVIDERS: &str = "NO_PROVIDERS";

// Every attempt is appended to the operation log; the report surface only
// exposes the most recent few.
const OP_LOG_CAP: usize = 100;
const REPORT_RECENT_OPS: usize = 10;

// ─── Records & outcome ────────────────────────────────────────────────────────

/// One logged fallback attempt (success or failure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub provider: String,
    pub operation: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// RFC 3339 timestamp of the attempt.
    pub timestamp: String,
}

/// Result of one chain invocation. Never an error.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub success: bool,
    pub result: Option<Value>,
    /// Name of the provider that served the call, or a sentinel code
    /// (`NO_PROVIDERS`, `ALL_FAILED (<n> attempts)`).
    pub source: String,
}

/// Per-capability status report.
#[derive(Debug, Clone, Serialize)]
pub struct ChainStatusReport {
    pub capability: String,
    /// Healthy if any provider is Healthy; Degraded if any provider has been
    /// observed struggling; Unknown otherwise.
    pub overall: ProviderHealth,
    pub providers: Vec<ProviderReportEntry>,
    pub recent_ops: Vec<AttemptRecord>,
}

/// One provider's snapshot inside a [`ChainStatusReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ProviderReportEntry {
    pub name: String,
    pub status: ProviderStatus,
}

// ─── ProviderChain ────────────────────────────────────────────────────────────

/// Ordered set of wrappers serving one named capability.
pub struct ProviderChain {
    capability: String,
    providers: Vec<Arc<ProviderWrapper>>,
    max_fallback_attempts: usize,
    op_log: RwLock<VecDeque<AttemptRecord>>,
}

impl ProviderChain {
    /// Build a chain attempting every provider (full fallback depth).
    pub fn new(capability: impl Into<String>, providers: Vec<Arc<ProviderWrapper>>) -> Self {
        let max_fallback_attempts = providers.len();
        Self {
            capability: capability.into(),
            providers,
            max_fallback_attempts,
            op_log: RwLock::new(VecDeque::new()),
        }
    }

    /// Cap the number of fallback attempts per invocation.
    pub fn with_max_attempts(mut self, max_fallback_attempts: usize) -> Self {
        self.max_fallback_attempts = max_fallback_attempts;
        self
    }

    /// Capability key this chain serves (e.g. `"llm"`).
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// The stored wrapper list, in construction order. Invocation never
    /// reorders this.
    pub fn providers(&self) -> &[Arc<ProviderWrapper>] {
        &self.providers
    }

    /// Invoke `operation`, falling back across providers in health order.
    pub async fn invoke(&self, operation: &str, params: Value) -> ChainOutcome {
        if self.providers.is_empty() {
            warn!(capability = %self.capability, operation, "chain has no providers");
            return ChainOutcome {
                success: false,
                result: None,
                source: NO_PROVIDERS.to_string(),
            };
        }

        let ordered = self.priority_order().await;
        let mut attempts = 0usize;

        for wrapper in ordered.iter().take(self.max_fallback_attempts.max(1)) {
            attempts += 1;
            let outcome = wrapper.invoke(operation, params.clone()).await;
            self.log_attempt(AttemptRecord {
                provider: wrapper.name().to_string(),
                operation: operation.to_string(),
                success: outcome.success,
                error: outcome.error.clone(),
                timestamp: Utc::now().to_rfc3339(),
            })
            .await;

            if outcome.success {
                debug!(
                    capability = %self.capability,
                    provider = %wrapper.name(),
                    attempts,
                    "chain call served"
                );
                return ChainOutcome {
                    success: true,
                    result: outcome.result,
                    source: wrapper.name().to_string(),
                };
            }
        }

        warn!(
            capability = %self.capability,
            operation,
            attempts,
            "all fallback attempts exhausted"
        );
        ChainOutcome {
            success: false,
            result: None,
            source: format!("ALL_FAILED ({attempts} attempts)"),
        }
    }

    /// Compute the health-prioritized attempt order on a derived copy.
    ///
    /// Sort key: health priority desc, success streak desc, last latency asc
    /// (missing latency sorts worst). The sort is stable, so fully tied
    /// providers keep their construction order.
    async fn priority_order(&self) -> Vec<Arc<ProviderWrapper>> {
        let mut snapshot: Vec<(Arc<ProviderWrapper>, ProviderStatus)> =
            Vec::with_capacity(self.providers.len());
        for wrapper in &self.providers {
            snapshot.push((Arc::clone(wrapper), wrapper.status().await));
        }

        snapshot.sort_by(|(_, a), (_, b)| {
            b.health
                .priority()
                .cmp(&a.health.priority())
                .then(b.consecutive_successes.cmp(&a.consecutive_successes))
                .then(a.latency_sort_key().cmp(&b.latency_sort_key()))
        });

        snapshot.into_iter().map(|(wrapper, _)| wrapper).collect()
    }

    async fn log_attempt(&self, record: AttemptRecord) {
        let mut log = self.op_log.write().await;
        if log.len() >= OP_LOG_CAP {
            log.pop_front();
        }
        log.push_back(record);
    }

    /// The most recent `limit` attempts, newest first.
    pub async fn recent_ops(&self, limit: usize) -> Vec<AttemptRecord> {
        let log = self.op_log.read().await;
        log.iter().rev().take(limit).cloned().collect()
    }

    /// Error message from the most recent failed attempt, if any.
    pub async fn last_error(&self) -> Option<String> {
        let log = self.op_log.read().await;
        log.iter().rev().find_map(|r| r.error.clone())
    }

    /// Overall capability health derived from the member providers.
    pub async fn overall_health(&self) -> ProviderHealth {
        let mut any_observed = false;
        for wrapper in &self.providers {
            match wrapper.status().await.health {
                ProviderHealth::Healthy => return ProviderHealth::Healthy,
                ProviderHealth::Degraded | ProviderHealth::Unhealthy => any_observed = true,
                ProviderHealth::Unknown => {}
            }
        }
        if any_observed {
            ProviderHealth::Degraded
        } else {
            ProviderHealth::Unknown
        }
    }

    /// Per-provider health plus the last few operations.
    pub async fn status_report(&self) -> ChainStatusReport {
        let mut providers = Vec::with_capacity(self.providers.len());
        for wrapper in &self.providers {
            providers.push(ProviderReportEntry {
                name: wrapper.name().to_string(),
                status: wrapper.status().await,
            });
        }
        ChainStatusReport {
            capability: self.capability.clone(),
            overall: self.overall_health().await,
            providers,
            recent_ops: self.recent_ops(REPORT_RECENT_OPS).await,
        }
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("capability", &self.capability)
            .field("providers", &self.providers.len())
            .field("max_fallback_attempts", &self.max_fallback_attempts)
            .finish()
    }
}

/// Shared chain handle, as registered with the self-check service.
pub type SharedProviderChain = Arc<ProviderChain>;

// ─── Tests ────────────────────────────────────────────────────────────────────
